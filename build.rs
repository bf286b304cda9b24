fn main() {
    // The Imgur client id is baked in at compile time.
    println!("cargo:rerun-if-env-changed=IMGUR_CLIENT_ID");
}
