fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rustc-link-arg-tests=-Tembedded-test.x");
    for var in [
        "HUMIDITY_API_KEY",
        "HUMIDITY_DB_URL",
        "HUMIDITY_AUTH_URL",
        "HUMIDITY_TOKEN_URL",
        "HUMIDITY_EMAIL",
        "HUMIDITY_PASSWORD",
        "HUMIDITY_BASE_PATH",
        "FIREBASE_API_KEY",
        "FIREBASE_DB_URL",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}
