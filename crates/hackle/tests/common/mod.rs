//! Helpers shared by the integration tests.

#![allow(dead_code)]

use hackle::{Ast, Entry, NodeId, Position, Value};

/// Zero out positions and node ids so parsed trees compare equal to
/// hand-built ones.
pub fn normalise(ast: &mut Ast) {
    ast.id = NodeId::UNSET;
    ast.pos = Position::default();
    normalise_entries(&mut ast.entries);
}

pub fn normalise_entries(entries: &mut [Entry]) {
    for entry in entries {
        match entry {
            Entry::Attribute(attr) => {
                attr.id = NodeId::UNSET;
                attr.pos = Position::default();
                if let Some(value) = &mut attr.value {
                    normalise_value(value);
                }
                if let Some(value) = &mut attr.default {
                    normalise_value(value);
                }
                for value in &mut attr.enum_values {
                    normalise_value(value);
                }
            }
            Entry::Block(block) => {
                block.id = NodeId::UNSET;
                block.pos = Position::default();
                normalise_entries(&mut block.body);
            }
            Entry::Comment(comment) => {
                comment.id = NodeId::UNSET;
                comment.pos = Position::default();
                comment.end_pos = Position::default();
            }
            Entry::Recursive(rec) => {
                rec.id = NodeId::UNSET;
                rec.pos = Position::default();
            }
        }
    }
}

pub fn normalise_value(value: &mut Value) {
    match value {
        Value::Bool(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
        }
        Value::Number(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
        }
        Value::Str(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
        }
        Value::Heredoc(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
        }
        Value::Type(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
        }
        Value::Call(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
            for arg in &mut v.args {
                normalise_value(arg);
            }
        }
        Value::List(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
            for element in &mut v.elements {
                normalise_value(element);
            }
        }
        Value::Map(v) => {
            v.id = NodeId::UNSET;
            v.pos = Position::default();
            for entry in &mut v.entries {
                entry.id = NodeId::UNSET;
                entry.pos = Position::default();
                normalise_value(&mut entry.key);
                normalise_value(&mut entry.value);
            }
        }
    }
}

/// The configuration exercised by the complex round-trip tests.
pub const COMPLEX_EXAMPLE: &str = r#"aws {
  credentials-provider = "ROTATING_JSON"
}

server {
  acl {
    disable = true

    get "/**" {
      users = ["*"]
      capabilities = ["users_service_owners"]
    }

    grpc "/mycompany.service.UserService/UpgradeUser" {
      services = ["servicea", "serviceb"]
      users = ["*"]
      capabilities = ["users_service_owners"]
    }

    // ACL for MergeUser.
    grpc "/mycompany.service.UserService/MergeUser" {
      services = ["servicea", "serviceb"]
      users = ["*"]
      capabilities = ["users_service_owners"]
    }

    grpc "/mycompany.service.UserService/AuthenticateUser" {
      services = ["servicea", "rewardly"]
      users = ["*"]
      capabilities = ["users_service_owners"]
    }

    grpc "/**" {
      services = ["servicea"]
      users = ["*"]
      capabilities = ["users_service_owners"]
    }
  }
}
"#;
