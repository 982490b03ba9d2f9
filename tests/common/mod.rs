#![allow(dead_code)]

use quotestash::FormData;
use serde_json::json;
use std::time::Duration;

pub fn sign_form(sign_type: &str) -> FormData {
    let mut form = FormData::new();
    form.insert("sign_type".to_string(), json!(sign_type));
    form.insert("width_cm".to_string(), json!(120));
    form.insert("colors".to_string(), json!(["red", "white"]));
    form
}

/// Spaces out writes so that consecutive quotes get distinct `created_at` values.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
