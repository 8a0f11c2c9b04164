//! `parkvote version` - display version information.

pub fn execute() {
    println!("parkvote {}", env!("CARGO_PKG_VERSION"));
    println!("Civic voting ledger for park redevelopment proposals");
}
