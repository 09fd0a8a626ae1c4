use autojson_build::{Config, Error, Output, Pass};

const ZOO: &str = r#"
    #[record]
    pub trait Animal {
        fn name(&self) -> &str;
        fn age(&self) -> Option<i64>;
    }
"#;

const SHAPES: &str = r#"
    #[record(designator = ShapeKind)]
    pub trait Shape {
        #[wire(name = "type")]
        fn kind(&self) -> ShapeKind;
    }

    #[record]
    pub trait Circle: Shape {
        fn radius(&self) -> i64;
    }

    #[record]
    pub trait Square: Shape {
        fn side(&self) -> i64;
    }

    pub enum ShapeKind {
        Circle,
        Square,
    }

    impl ShapeKind {
        #[variant_type]
        pub fn schema(&self) -> &'static str {
            match self {
                Self::Circle => "Circle",
                Self::Square => "Square",
            }
        }
    }
"#;

fn run(config: Config) -> Output {
    Pass::new(config)
        .source_text("zoo.rs", ZOO, "crate::zoo")
        .source_text("shapes.rs", SHAPES, "crate::shapes")
        .run()
        .expect("run")
}

#[test]
fn clean_pass_has_no_diagnostics() {
    let output = run(Config::default());

    output.check().expect("no errors");
    assert!(output.reporter.warnings().is_empty());
    assert_eq!(output.artifacts.len(), 4);
    assert_eq!(output.registry.len(), 4);
}

#[test]
fn animal_record_defaults_its_optional_field() {
    let output = run(Config::default());
    let record = output
        .artifact("crate::zoo::Animal")
        .and_then(|artifact| artifact.record.as_ref())
        .expect("record");

    assert!(record.code.contains("pub struct AnimalRecord"));
    assert!(record.code.contains("# [serde (rename = \"name\")] name : String"));
    assert!(record.code.contains("skip_serializing_if = \"::core::option::Option::is_none\""));
    assert!(record.code.contains("pub const AGE : & 'static str = \"age\""));
    assert!(record.code.contains("fn name (& self) -> & str { & self . name }"));
    assert!(record.code.contains("fn age (& self) -> Option < i64 > { self . age . clone () }"));
}

#[test]
fn polymorphic_root_gets_only_a_dispatching_decoder() {
    let output = run(Config::default());
    let shape = output.artifact("crate::shapes::Shape").expect("shape");

    assert!(shape.record.is_none());

    let code = &shape.decoder.code;
    assert!(code.contains("tree . get (\"type\")"));
    assert!(code.contains("MissingDiscriminator"));
    assert!(code.contains("crate :: shapes :: ShapeKind :: Circle { .. } =>"));
    assert!(code.contains("tree_to_record :: < SquareRecord > (tree)"));
}

#[test]
fn variants_carry_the_inherited_tag() {
    let output = run(Config::default());
    let circle = output
        .artifact("crate::shapes::Circle")
        .and_then(|artifact| artifact.schema.as_ref())
        .expect("circle");

    assert_eq!(circle.wire_names().collect::<Vec<_>>(), vec!["radius", "type"]);
    assert!(circle.implements("crate::shapes::Shape"));
}

#[test]
fn suffixes_come_from_the_config() {
    let config = Config::from_toml("record_suffix = \"Data\"\nfail_on_unknown_fields = true").expect("config");
    let output = run(config);
    let units = output.units();

    assert!(units.iter().any(|unit| unit.file == "animal_data.rs"));
    assert!(output.registry.fail_on_unknown_fields());
    assert!(output.render().contains("fail_on_unknown_fields (true)"));
}

#[test]
fn colliding_generated_name_fails_both_schemas() {
    let src = format!("{ZOO}\n#[record]\npub trait AnimalRecord {{ fn tag(&self) -> String; }}");
    let output = Pass::new(Config::default())
        .source_text("zoo.rs", src, "crate::zoo")
        .run()
        .expect("run");

    let err = output.check().expect_err("collision");
    assert!(matches!(err, Error::Generation(_)));
    assert!(output.artifact("crate::zoo::Animal").expect("animal").is_stub());
}

#[test]
fn generic_record_drops_derived_serde_bounds() {
    let src = r#"
        pub trait Holder<T = i64> {
            fn value(&self) -> T;
        }

        #[record]
        pub trait Boxed<V = String>: Holder<V> {}
    "#;
    let output = Pass::new(Config::default())
        .source_text("holder.rs", src, "crate::holder")
        .run()
        .expect("run");
    output.check().expect("no errors");

    let boxed = output
        .artifact("crate::holder::Boxed")
        .and_then(|artifact| artifact.record.as_ref())
        .expect("boxed record");
    assert!(boxed.code.contains("pub struct BoxedRecord < V : :: autojson :: FieldValue >"));
    assert!(boxed.code.contains("bound = \"\""));

    let animal = run(Config::default());
    let animal = animal
        .artifact("crate::zoo::Animal")
        .and_then(|artifact| artifact.record.as_ref())
        .expect("animal record");
    assert!(!animal.code.contains("bound ="));
}
