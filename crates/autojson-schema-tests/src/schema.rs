use autojson::prelude::*;

///
/// Animal
///

#[record]
pub trait Animal {
    fn name(&self) -> &str;

    fn age(&self) -> Option<i64>;
}

///
/// Holder
/// Plain ancestor; its parameter is bound by whoever inherits it.
///

pub trait Holder<T> {
    fn value(&self) -> T;

    fn label(&self) -> String;
}

///
/// Counter
/// Binds `Holder` to a concrete argument.
///

#[record]
pub trait Counter: Holder<i64> {}

///
/// Boxed
/// Open parameter; registered with its upper bound.
///

#[record]
pub trait Boxed<V = String>: Holder<V> {}

///
/// Tagged
///

#[schema]
pub trait Tagged {
    #[wire(name = "tag_list")]
    fn get_tags(&self) -> &[String];

    fn is_pinned(&self) -> bool;
}

///
/// Note
///

#[record]
pub trait Note: Tagged {
    fn body(&self) -> &str;
}
