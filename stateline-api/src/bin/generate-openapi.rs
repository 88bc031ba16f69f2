//! OpenAPI Specification Generator Binary
//!
//! Generates the Stateline OpenAPI specification as JSON to stdout.
//! Used to publish the spec or generate client code.
//!
//! Usage:
//!   cargo run -p stateline-api --bin generate-openapi > openapi.json

use stateline_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
