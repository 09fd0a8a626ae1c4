use autojson::{Record, prelude::*};

#[record]
pub trait Animal {
    fn name(&self) -> &str;
}

#[record]
pub trait Holder<T = i64>
where
    T: Clone,
{
    fn value(&self) -> T;
}

fn assert_record<T: Record + ?Sized>() {}

fn main() {
    assert_record::<dyn Animal>();
    assert_record::<dyn Holder>();
}
