mod build_context;
mod catalog;
mod common;
mod pipeline;
mod stages;
