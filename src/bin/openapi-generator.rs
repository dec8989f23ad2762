//! Print the OpenAPI document as pretty JSON, for committing alongside docs.

use hotseat_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().unwrap());
}
