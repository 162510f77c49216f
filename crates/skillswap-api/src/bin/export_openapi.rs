// Export the OpenAPI document as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// Generates the document without starting the server.

use skillswap_api::openapi::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI document: {}", e);
            std::process::exit(1);
        }
    }
}
