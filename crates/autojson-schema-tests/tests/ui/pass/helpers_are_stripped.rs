use autojson::prelude::*;

#[schema]
pub trait Tagged {
    #[wire(name = "tag_list")]
    fn tags(&self) -> Vec<String>;
}

#[record(designator = Kind)]
pub trait Shape: Tagged {
    #[wire(name = "type")]
    fn kind(&self) -> Kind;
}

#[derive(Clone, Copy, Debug)]
pub enum Kind {
    Circle,
}

impl Kind {
    #[variant_type]
    pub const fn schema(&self) -> &'static str {
        match self {
            Self::Circle => "Circle",
        }
    }
}

fn describe(shape: &dyn Shape) -> &'static str {
    shape.schema_name()
}

fn main() {
    let _ = describe;
    assert_eq!(Kind::Circle.schema(), "Circle");
}
