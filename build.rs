fn main() {
    // The kernel binary defines its own `_start`; keep the host C runtime's
    // start files out of its link. Library tests still link normally.
    println!("cargo:rustc-link-arg-bins=-nostartfiles");
}
