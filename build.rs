use std::env;

fn main() {
    println!("cargo:rerun-if-changed=.env");
    let _ = dotenvy::from_filename(".env");

    let secret = env_or_default("ORDER_BUTTON_SECRET", "");
    if secret.is_empty() {
        println!("cargo:warning=ORDER_BUTTON_SECRET is not set; orders will be signed with an empty key");
    }

    println!("cargo:rustc-env=ORDER_BUTTON_SECRET={secret}");
    for (key, fallback) in [
        ("ORDER_BUTTON_HOST", ""),
        ("ORDER_BUTTON_PORT", "80"),
        ("ORDER_BUTTON_PATH", ""),
    ] {
        println!("cargo:rerun-if-env-changed={key}");
        println!("cargo:rustc-env={key}={}", env_or_default(key, fallback));
    }
    println!("cargo:rerun-if-env-changed=ORDER_BUTTON_SECRET");
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
