//! Transcodes a JSON document to CBOR and prints both forms.
//!
//! ```sh
//! cargo run --example transcode
//! ```

use tagstream::cbor::CborEncodeOptions;
use tagstream::{decode_json, encode_cbor, ParseOptions};

fn main() {
    let doc = br#"{
        "title": "sensor readings",
        "timestamp": "2013-03-21T20:04:00Z",
        "values": [20.5, 21.25, 19.75],
        "total": 18446744073709551616
    }"#;

    let tree = decode_json(doc, ParseOptions::default()).expect("valid JSON");
    println!("tree: {tree}");

    let bytes = encode_cbor(&tree, CborEncodeOptions::default()).expect("encodable tree");
    print!("cbor ({} bytes):", bytes.len());
    for b in &bytes {
        print!(" {b:02x}");
    }
    println!();

    let packed = encode_cbor(
        &tree,
        CborEncodeOptions {
            pack_strings: true,
            ..Default::default()
        },
    )
    .expect("encodable tree");
    println!("packed: {} bytes", packed.len());
}
