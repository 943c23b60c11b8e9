pub mod app;
pub mod cat;
pub mod describe;
pub mod export;
pub mod ls;

/// Split `a/b` style arguments into loader segments.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}
