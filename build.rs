fn main() {
    // ESP-IDF build metadata is only needed when cross-compiling for the
    // device. Host builds (tests) skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
