//! Marshalling behavior.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hackle::{HclRecord, Options};

#[derive(HclRecord, Debug, PartialEq, Default)]
struct VarArgLabelBlock {
    #[hcl(label)]
    path: Vec<String>,
}

#[test]
fn test_scalars() {
    #[derive(HclRecord)]
    struct Conf {
        str: String,
        int: i64,
        float: f64,
        bool: bool,
    }
    let out = hackle::marshal(&Conf {
        str: "str".into(),
        int: 123,
        float: 123.456,
        bool: true,
    })
    .unwrap();
    assert_eq!(out, "str = \"str\"\nint = 123\nfloat = 123.456\nbool = true\n");
}

#[test]
fn test_lists_and_maps() {
    #[derive(HclRecord)]
    struct Conf {
        map: HashMap<String, String>,
        list: Vec<i64>,
    }
    let out = hackle::marshal(&Conf {
        map: HashMap::from([
            ("hello".to_string(), "world".to_string()),
            ("waz".to_string(), "foo".to_string()),
        ]),
        list: vec![1, 2, 3],
    })
    .unwrap();
    assert_eq!(
        out,
        "map = {\n  \"hello\": \"world\",\n  \"waz\": \"foo\",\n}\nlist = [1, 2, 3]\n"
    );
}

#[test]
fn test_vararg_block_labels() {
    #[derive(HclRecord)]
    struct Conf {
        #[hcl(block)]
        block: VarArgLabelBlock,
    }
    let out = hackle::marshal(&Conf {
        block: VarArgLabelBlock {
            path: vec!["multiple".into(), "labels".into(), "varargs".into()],
        },
    })
    .unwrap();
    assert_eq!(out, "block multiple labels varargs {}\n");
}

#[test]
fn test_long_vararg_block_labels() {
    #[derive(HclRecord)]
    struct Conf {
        #[hcl(block)]
        block: VarArgLabelBlock,
    }
    let out = hackle::marshal(&Conf {
        block: VarArgLabelBlock {
            path: [
                "multiple", "labels", "var-args", "really", "really is", "really", "really",
                "long", "labels", "that", "are", "really", "long",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        },
    })
    .unwrap();
    assert_eq!(
        out,
        "block multiple labels var-args really \"really is\" really really long labels that are\n      really long {}\n"
    );
}

#[test]
fn test_heredocs() {
    #[derive(HclRecord)]
    struct Nested {
        str: String,
    }
    #[derive(HclRecord)]
    struct Conf {
        #[hcl(block)]
        nested: Nested,
    }
    let out = hackle::marshal_with(
        &Conf {
            nested: Nested {
                str: "hello\nworld\nwhat's".into(),
            },
        },
        &Options::new().heredocs_for_multiline(2),
    )
    .unwrap();
    assert_eq!(
        out,
        "nested {\n  str = <<-EOF\nhello\nworld\nwhat's\nEOF\n}\n"
    );
}

#[test]
fn test_duration_and_time() {
    #[derive(HclRecord)]
    struct Conf {
        time: DateTime<Utc>,
        duration: Duration,
    }
    let out = hackle::marshal(&Conf {
        time: DateTime::parse_from_rfc3339("2020-01-02T15:04:05Z")
            .unwrap()
            .with_timezone(&Utc),
        duration: Duration::from_secs(5),
    })
    .unwrap();
    assert_eq!(out, "time = \"2020-01-02T15:04:05Z\"\nduration = \"5s\"\n");
}

#[derive(Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct JsonValue {
    hello: String,
}

hackle::json_codec!(JsonValue);

#[test]
fn test_codec_marshalling() {
    #[derive(HclRecord)]
    struct Conf {
        json: JsonValue,
    }
    let out = hackle::marshal(&Conf {
        json: JsonValue {
            hello: "world".into(),
        },
    })
    .unwrap();
    assert_eq!(out, "json = \"{\\\"hello\\\":\\\"world\\\"}\"\n");
}

#[test]
fn test_infer_hcl_tags() {
    #[derive(HclRecord, Default)]
    struct Inner {
        str: String,
    }
    #[derive(HclRecord, Default)]
    struct Conf {
        block: Inner,
    }
    let conf = Conf {
        block: Inner { str: "val".into() },
    };
    let out = hackle::marshal_with(&conf, &Options::new().infer_hcl_tags(true)).unwrap();
    assert_eq!(out, "block {\n  str = \"val\"\n}\n");

    // Without inference an untagged record field has no attribute form.
    let err = hackle::marshal(&conf).unwrap_err();
    assert!(err.to_string().contains("used as attribute"), "{err}");
}

#[test]
fn test_default_values() {
    #[derive(HclRecord, Debug, Default)]
    struct Conf {
        #[hcl(name = "strVal", default = "str")]
        str_val: String,
        #[hcl(name = "strSameDefault", default = "str")]
        str_same_default: String,
        #[hcl(name = "strDiffDefault", default = "str")]
        str_diff_default: String,
        #[hcl(name = "intVal", default = "1")]
        int_val: i64,
        #[hcl(name = "intSameDefault", default = "1")]
        int_same_default: i64,
        #[hcl(name = "intDiffDefault", default = "1")]
        int_diff_default: i64,
        #[hcl(name = "floatVal", default = "2.33")]
        float_val: f64,
        #[hcl(name = "floatSameDefault", default = "2.33")]
        float_same_default: f64,
        #[hcl(name = "floatDiffDefault", default = "2.33")]
        float_diff_default: f64,
        #[hcl(name = "sliceVal", default = "a,b,c")]
        slice_val: Vec<String>,
        #[hcl(name = "sliceSameDefault", default = "a,b,c")]
        slice_same_default: Vec<String>,
        #[hcl(name = "sliceDiffDefault", default = "a,b,c")]
        slice_diff_default: Vec<String>,
        #[hcl(name = "mapVal", default = "a=4;b=5;c=6")]
        map_val: HashMap<String, i32>,
        #[hcl(name = "mapSameDefault", default = "a=4;b=5;c=6")]
        map_same_default: HashMap<String, i32>,
        #[hcl(name = "mapDiffDefault", default = "a=4;b=5;c=6")]
        map_diff_default: HashMap<String, i32>,
    }

    let out = hackle::marshal(&Conf {
        str_same_default: "str".into(),
        str_diff_default: "diff".into(),
        int_same_default: 1,
        int_diff_default: 2,
        float_same_default: 2.33,
        float_diff_default: 3.44,
        slice_same_default: vec!["a".into(), "b".into(), "c".into()],
        slice_diff_default: vec!["c".into(), "d".into(), "e".into()],
        map_same_default: HashMap::from([
            ("a".to_string(), 4),
            ("b".to_string(), 5),
            ("c".to_string(), 6),
        ]),
        map_diff_default: HashMap::from([
            ("e".to_string(), 7),
            ("f".to_string(), 8),
            ("g".to_string(), 9),
        ]),
        ..Conf::default()
    })
    .unwrap();
    assert_eq!(
        out,
        r#"strVal = ""
strDiffDefault = "diff"
intVal = 0
intDiffDefault = 2
floatVal = 0
floatDiffDefault = 3.44
sliceVal = []
sliceDiffDefault = ["c", "d", "e"]
mapVal = {
}
mapDiffDefault = {
  "e": 7,
  "f": 8,
  "g": 9,
}
"#
    );
}

#[test]
fn test_unmarshal_then_marshal() {
    #[derive(HclRecord, Debug, PartialEq)]
    struct Conf {
        val: String,
        #[hcl(name = "default_val", default = "test")]
        default_val: String,
        #[hcl(name = "default_val_2", default = "60")]
        default_val_2: i64,
    }

    let source = "val = \"val\"\ndefault_val = \"2\"\n";
    let conf: Conf = hackle::unmarshal(source).unwrap();
    assert_eq!(conf.val, "val");
    assert_eq!(conf.default_val, "2");
    assert_eq!(conf.default_val_2, 60);

    let out = hackle::marshal(&conf).unwrap();
    assert_eq!(out, source);
}

#[test]
fn test_optional_default_omitted() {
    #[derive(HclRecord, Debug, Default)]
    struct Embedded {
        #[hcl(name = "inner", optional, default = "inner")]
        inner: Option<String>,
    }
    #[derive(HclRecord, Debug, Default)]
    struct Root {
        #[hcl(name = "outer", optional)]
        outer: String,
        #[hcl(flatten)]
        embedded: Embedded,
    }
    let out = hackle::marshal(&Root::default()).unwrap();
    assert_eq!(out, "");
}

#[test]
fn test_help_comments() {
    #[derive(HclRecord)]
    struct Conf {
        #[hcl(help = "An attribute.")]
        attr: String,
    }
    let conf = Conf {
        attr: "string".into(),
    };
    assert_eq!(hackle::marshal(&conf).unwrap(), "attr = \"string\"\n");
    assert_eq!(
        hackle::marshal_with(&conf, &Options::new().schema_comments(true)).unwrap(),
        "// An attribute.\nattr = \"string\"\n"
    );
}

#[test]
fn test_help_enum_default_comments() {
    #[derive(HclRecord)]
    struct Conf {
        #[hcl(help = "An attribute.", enum = "blue,green,string", default = "blue")]
        attr: String,
    }
    let out = hackle::marshal_with(
        &Conf {
            attr: "string".into(),
        },
        &Options::new().schema_comments(true),
    )
    .unwrap();
    assert_eq!(
        out,
        "// An attribute.\n// enum: blue,green,string\n// default: blue\nattr = \"string\"\n"
    );
}

#[test]
fn test_omitted_block() {
    #[derive(HclRecord, Default)]
    struct Html {
        url: String,
    }
    #[derive(HclRecord, Default)]
    struct Conf {
        #[hcl(name = "html", block)]
        html: Option<Html>,
    }
    assert_eq!(hackle::marshal(&Conf::default()).unwrap(), "");
}

#[test]
fn test_round_trip_empty_list_and_map() {
    use hackle::{Ast, Attribute, Value};

    #[derive(HclRecord, Debug, PartialEq)]
    struct ListConf {
        list: Vec<String>,
    }
    let ast = Ast::from_entries(vec![Attribute::new("list", Value::list(vec![])).into()]);
    let conf: ListConf = hackle::unmarshal_ast(&ast).unwrap();
    assert_eq!(conf.list, Vec::<String>::new());

    #[derive(HclRecord, Debug, PartialEq)]
    struct MapConf {
        map: HashMap<String, String>,
    }
    let ast = Ast::from_entries(vec![Attribute::new("map", Value::map(vec![])).into()]);
    let conf: MapConf = hackle::unmarshal_ast(&ast).unwrap();
    assert_eq!(conf.map, HashMap::new());
}

#[test]
fn test_remain_round_trip() {
    #[derive(HclRecord, Debug, PartialEq, Default)]
    struct Conf {
        name: String,
        #[hcl(remain)]
        remain: Vec<hackle::Entry>,
    }
    let conf: Conf = hackle::unmarshal("name = \"hello\"\nworld = \"world\"\nhow = 1").unwrap();
    let out = hackle::marshal(&conf).unwrap();
    assert_eq!(out, "name = \"hello\"\nhow = 1\nworld = \"world\"\n");
}

#[test]
fn test_labels_rejected_at_top_level() {
    #[derive(HclRecord, Debug, Default)]
    struct Conf {
        #[hcl(label)]
        label: String,
    }
    let err = hackle::marshal(&Conf {
        label: "oops".into(),
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "unexpected labels oops at top level");
}
