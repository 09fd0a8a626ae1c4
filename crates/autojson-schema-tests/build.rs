fn main() -> Result<(), Box<dyn std::error::Error>> {
    autojson::build!();

    Ok(())
}
