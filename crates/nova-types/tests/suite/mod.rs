mod bootstrap;
mod erasure;
mod fixtures;
mod hierarchy;
mod method_kinds;
mod scenarios;
mod tokens;
