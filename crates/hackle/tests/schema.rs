//! Schema reflection output.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use hackle::{HclRecord, Options};

#[derive(HclRecord, Debug, Default)]
struct SchemaBlock {
    #[hcl(label)]
    name: String,
    #[hcl(name = "attr")]
    attr: Option<String>,
}

#[derive(HclRecord, Debug, Default)]
struct SchemaRepeatedBlock {
    #[hcl(name = "label0", label)]
    label0: String,
    #[hcl(name = "label1", label)]
    label1: String,
    #[hcl(name = "attr")]
    attr: String,
}

#[derive(HclRecord, Debug, Default)]
struct TestSchema {
    #[hcl(name = "str", help = "A string field.")]
    str: String,
    #[hcl(name = "num", optional)]
    num: i64,
    #[hcl(name = "bool")]
    bool: bool,
    #[hcl(name = "list")]
    list: Vec<String>,
    #[hcl(name = "map", help = "A map.")]
    map: HashMap<String, i64>,
    #[hcl(name = "block", block, help = "A block.")]
    block: SchemaBlock,
    #[hcl(name = "block_slice", block, help = "Repeated blocks.")]
    block_slice: Vec<SchemaRepeatedBlock>,
    #[hcl(name = "default_str", default = "def")]
    default_str: String,
    #[hcl(name = "enum_str", enum = "a,b,c")]
    enum_str: String,
}

#[test]
fn test_schema() {
    let schema = hackle::schema::<TestSchema>().unwrap();
    let out = hackle::marshal_ast(&schema);
    assert_eq!(
        out,
        r#"// A string field.
str = string
num = number(optional)
bool = boolean
list = [string]
// A map.
map = {
  string: number,
}

// A block.
block name {
  attr = string
}

// Repeated blocks.
block_slice(repeated) label0 label1 {
  attr = string
}

default_str = string(optional default("def"))
enum_str = string(enum("a", "b", "c"))
"#
    );
}

#[test]
fn test_schema_json_projection() {
    let schema = hackle::schema::<TestSchema>().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&hackle::to_json(&schema).unwrap()).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 9);
    assert_eq!(
        entries[0],
        serde_json::json!({
            "attribute": {
                "comments": ["A string field."],
                "key": "str",
                "value": "string",
            }
        })
    );
    assert_eq!(
        entries[1],
        serde_json::json!({
            "attribute": {"key": "num", "value": "number", "optional": true}
        })
    );
    assert_eq!(
        entries[3],
        serde_json::json!({
            "attribute": {"key": "list", "value": ["string"]}
        })
    );
    assert_eq!(
        entries[7],
        serde_json::json!({
            "attribute": {
                "key": "default_str",
                "value": "string",
                "default": "def",
                "optional": true,
            }
        })
    );
    assert_eq!(
        entries[8],
        serde_json::json!({
            "attribute": {
                "key": "enum_str",
                "value": "string",
                "enum": ["a", "b", "c"],
            }
        })
    );
    let block = &entries[6]["block"];
    assert_eq!(block["name"], "block_slice");
    assert_eq!(block["labels"], serde_json::json!(["label0", "label1"]));
    assert_eq!(block["repeated"], serde_json::json!(true));
}

#[test]
fn test_block_schema() {
    #[derive(HclRecord, Debug, Default)]
    struct Block {
        #[hcl(label)]
        label: String,
        #[hcl(name = "attr")]
        attr: String,
    }
    let schema = hackle::block_schema::<Block>("block").unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        "block label {\n  attr = string\n}\n"
    );
}

#[test]
fn test_duration_schema() {
    #[derive(HclRecord, Debug, Default)]
    struct Conf {
        #[hcl(name = "delay", optional, default = "24h")]
        delay: Duration,
    }
    let schema = hackle::schema::<Conf>().unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        "delay = string(optional default(\"24h\"))\n"
    );

    #[derive(HclRecord, Debug, Default)]
    struct PtrConf {
        #[hcl(name = "delay", optional, default = "24h")]
        delay: Option<Duration>,
    }
    let schema = hackle::schema::<PtrConf>().unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        "delay = string(optional default(\"24h\"))\n"
    );
}

#[test]
fn test_inferred_schema() {
    #[derive(HclRecord, Debug, Default)]
    struct KeyValue {
        #[hcl(name = "key")]
        key: String,
        #[hcl(name = "value", optional)]
        value: String,
    }
    #[derive(HclRecord, Debug, Default)]
    struct ObjectRef {
        #[hcl(name = "name")]
        name: String,
    }
    #[derive(HclRecord, Debug, Default)]
    struct Tagged {
        str: String,
        config: KeyValue,
        options: Option<KeyValue>,
        refs: Vec<ObjectRef>,
    }
    let schema =
        hackle::schema_with::<Tagged>(&Options::new().infer_hcl_tags(true)).unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        r#"str = string(optional)

config {
  key = string
  value = string(optional)
}

options {
  key = string
  value = string(optional)
}

refs(repeated) {
  name = string
}
"#
    );
}

#[test]
fn test_schema_recursion() {
    #[derive(HclRecord, Debug, Default)]
    struct Recursive {
        name: String,
        #[hcl(name = "recursive", block)]
        recursive: Option<Box<Recursive>>,
    }
    let schema = hackle::schema::<Recursive>().unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        "name = string(optional)\n\nrecursive {\n  // (recursive)\n}\n"
    );
}

#[test]
fn test_mutual_recursion() {
    #[derive(HclRecord, Debug, Default)]
    struct A {
        #[hcl(name = "b", block)]
        b: Option<Box<B>>,
    }
    #[derive(HclRecord, Debug, Default)]
    struct B {
        #[hcl(name = "a", block)]
        a: Option<Box<A>>,
    }
    let schema = hackle::schema::<A>().unwrap();
    assert_eq!(
        hackle::marshal_ast(&schema),
        "b {\n  a {\n    // (recursive)\n  }\n}\n"
    );
}

#[test]
fn test_schema_round_trips_through_parser() {
    let schema = hackle::schema::<TestSchema>().unwrap();
    let printed = hackle::marshal_ast(&schema);
    let reparsed = hackle::parse(&printed).unwrap();
    assert_eq!(hackle::marshal_ast(&reparsed), printed);
}
