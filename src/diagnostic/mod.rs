pub(crate) mod color;
pub(crate) mod context;
pub(crate) mod formatter;
pub(crate) mod highlight;
pub(crate) mod page;
