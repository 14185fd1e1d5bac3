pub(crate) mod builder;
pub(crate) mod lanes;
pub(crate) mod phase;
pub(crate) mod report;
