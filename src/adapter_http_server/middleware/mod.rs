pub(crate) mod tracing;
