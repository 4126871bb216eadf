// Generates host bindings from the compiled txlink-core library:
// cargo run -p uniffi-bindgen -- generate --library <libtxlink_core> --language swift --out-dir <dir>
fn main() {
    uniffi::uniffi_bindgen_main()
}
