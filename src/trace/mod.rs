pub(crate) mod bus;
pub(crate) mod debug;
pub(crate) mod event;
pub(crate) mod guard;
pub(crate) mod log;
