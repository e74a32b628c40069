#![forbid(unsafe_code)]

/// `embed_migrations!` is not re-run when only the SQL files change, so the
/// build script tells cargo to rebuild the crate whenever the migrations
/// directory is touched.
fn main() {
    println!("cargo:rerun-if-changed=./src/migrations");
}
