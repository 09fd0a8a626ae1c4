use autojson::prelude::*;

///
/// Shape
/// Polymorphic root; `type` selects the variant record.
///

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

///
/// ShapeKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeKind {
    Circle,
    Square,
}

impl ShapeKind {
    #[variant_type]
    #[must_use]
    pub const fn schema(&self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Square => "Square",
        }
    }
}
