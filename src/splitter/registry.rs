//! Static language registry: language id -> grammar + splittable node kinds
//!
//! Every supported language is described by one [`LanguageConfig`] entry,
//! reachable through any of its aliases. Lookups are case-insensitive and a
//! miss is not an error: it is the signal to use the line-window fallback.

use std::collections::HashMap;
use std::sync::LazyLock;
use tree_sitter::Language;

/// Pattern family used by the context builder for import/type/constant
/// detection and ancestor signature truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextFamily {
    Rust,
    Python,
    JavaScript,
    Go,
    Jvm,
    C,
    Ruby,
    Php,
    Swift,
}

impl ContextFamily {
    /// Delimiter that opens a block in a container signature line, if any
    pub fn block_delimiter(self) -> Option<char> {
        match self {
            ContextFamily::Python => Some(':'),
            ContextFamily::Ruby => None,
            _ => Some('{'),
        }
    }
}

/// Capability record for a supported language
#[derive(Debug)]
pub struct LanguageConfig {
    /// Canonical language id stored on every chunk
    pub name: &'static str,
    /// Accepted ids (lowercase), including the canonical one
    pub aliases: &'static [&'static str],
    grammar: fn() -> Language,
    /// Node kinds that become chunk boundaries, in declaration order
    pub node_types: &'static [&'static str],
    /// Subset of `node_types` whose signature is inherited as ancestor context
    pub container_types: &'static [&'static str],
    pub family: ContextFamily,
}

impl LanguageConfig {
    /// Grammar handle for the parser toolkit
    pub fn grammar(&self) -> Language {
        (self.grammar)()
    }

    pub fn is_splittable(&self, kind: &str) -> bool {
        self.node_types.contains(&kind)
    }

    pub fn is_container(&self, kind: &str) -> bool {
        self.container_types.contains(&kind)
    }
}

fn rust_grammar() -> Language {
    tree_sitter_rust::LANGUAGE.into()
}

fn python_grammar() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

fn javascript_grammar() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

fn typescript_grammar() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn tsx_grammar() -> Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

fn go_grammar() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

fn java_grammar() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

fn c_grammar() -> Language {
    tree_sitter_c::LANGUAGE.into()
}

fn cpp_grammar() -> Language {
    tree_sitter_cpp::LANGUAGE.into()
}

fn csharp_grammar() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

fn ruby_grammar() -> Language {
    tree_sitter_ruby::LANGUAGE.into()
}

fn php_grammar() -> Language {
    tree_sitter_php::LANGUAGE_PHP.into()
}

fn swift_grammar() -> Language {
    tree_sitter_swift::LANGUAGE.into()
}

const TYPESCRIPT_NODE_TYPES: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "arrow_function",
    "class_declaration",
    "abstract_class_declaration",
    "method_definition",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "internal_module",
];

const TYPESCRIPT_CONTAINER_TYPES: &[&str] = &[
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "internal_module",
];

static LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        name: "rust",
        aliases: &["rust", "rs"],
        grammar: rust_grammar,
        node_types: &[
            "function_item",
            "impl_item",
            "trait_item",
            "struct_item",
            "enum_item",
            "union_item",
            "mod_item",
            "macro_definition",
        ],
        container_types: &["impl_item", "trait_item", "mod_item"],
        family: ContextFamily::Rust,
    },
    LanguageConfig {
        name: "python",
        aliases: &["python", "py"],
        grammar: python_grammar,
        node_types: &[
            "function_definition",
            "class_definition",
            "decorated_definition",
        ],
        container_types: &["class_definition"],
        family: ContextFamily::Python,
    },
    LanguageConfig {
        name: "javascript",
        aliases: &["javascript", "js", "jsx", "mjs", "cjs"],
        grammar: javascript_grammar,
        node_types: &[
            "function_declaration",
            "generator_function_declaration",
            "arrow_function",
            "class_declaration",
            "class",
            "method_definition",
        ],
        container_types: &["class_declaration", "class"],
        family: ContextFamily::JavaScript,
    },
    LanguageConfig {
        name: "typescript",
        aliases: &["typescript", "ts"],
        grammar: typescript_grammar,
        node_types: TYPESCRIPT_NODE_TYPES,
        container_types: TYPESCRIPT_CONTAINER_TYPES,
        family: ContextFamily::JavaScript,
    },
    LanguageConfig {
        name: "tsx",
        aliases: &["tsx"],
        grammar: tsx_grammar,
        node_types: TYPESCRIPT_NODE_TYPES,
        container_types: TYPESCRIPT_CONTAINER_TYPES,
        family: ContextFamily::JavaScript,
    },
    LanguageConfig {
        name: "go",
        aliases: &["go", "golang"],
        grammar: go_grammar,
        node_types: &[
            "function_declaration",
            "method_declaration",
            "type_declaration",
        ],
        container_types: &[],
        family: ContextFamily::Go,
    },
    LanguageConfig {
        name: "java",
        aliases: &["java"],
        grammar: java_grammar,
        node_types: &[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
            "record_declaration",
            "method_declaration",
            "constructor_declaration",
        ],
        container_types: &[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
            "record_declaration",
        ],
        family: ContextFamily::Jvm,
    },
    LanguageConfig {
        name: "c",
        aliases: &["c", "h"],
        grammar: c_grammar,
        node_types: &[
            "function_definition",
            "struct_specifier",
            "enum_specifier",
            "union_specifier",
            "type_definition",
        ],
        container_types: &[],
        family: ContextFamily::C,
    },
    LanguageConfig {
        name: "cpp",
        aliases: &["cpp", "c++", "cc", "cxx", "hpp", "hh", "hxx"],
        grammar: cpp_grammar,
        node_types: &[
            "function_definition",
            "class_specifier",
            "struct_specifier",
            "enum_specifier",
            "union_specifier",
            "namespace_definition",
            "template_declaration",
        ],
        container_types: &["class_specifier", "struct_specifier", "namespace_definition"],
        family: ContextFamily::C,
    },
    LanguageConfig {
        name: "csharp",
        aliases: &["csharp", "cs", "c#"],
        grammar: csharp_grammar,
        node_types: &[
            "namespace_declaration",
            "class_declaration",
            "struct_declaration",
            "interface_declaration",
            "enum_declaration",
            "method_declaration",
            "constructor_declaration",
            "property_declaration",
        ],
        container_types: &[
            "namespace_declaration",
            "class_declaration",
            "struct_declaration",
            "interface_declaration",
        ],
        family: ContextFamily::Jvm,
    },
    LanguageConfig {
        name: "ruby",
        aliases: &["ruby", "rb"],
        grammar: ruby_grammar,
        node_types: &["class", "module", "singleton_class", "method", "singleton_method"],
        container_types: &["class", "module", "singleton_class"],
        family: ContextFamily::Ruby,
    },
    LanguageConfig {
        name: "php",
        aliases: &["php"],
        grammar: php_grammar,
        node_types: &[
            "namespace_definition",
            "class_declaration",
            "interface_declaration",
            "trait_declaration",
            "enum_declaration",
            "function_definition",
            "method_declaration",
        ],
        container_types: &[
            "class_declaration",
            "interface_declaration",
            "trait_declaration",
            "enum_declaration",
        ],
        family: ContextFamily::Php,
    },
    LanguageConfig {
        name: "swift",
        aliases: &["swift"],
        grammar: swift_grammar,
        node_types: &[
            "class_declaration",
            "protocol_declaration",
            "function_declaration",
            "init_declaration",
            "deinit_declaration",
            "subscript_declaration",
        ],
        container_types: &["class_declaration", "protocol_declaration"],
        family: ContextFamily::Swift,
    },
];

static BY_ALIAS: LazyLock<HashMap<&'static str, &'static LanguageConfig>> = LazyLock::new(|| {
    LANGUAGES
        .iter()
        .flat_map(|config| config.aliases.iter().map(move |alias| (*alias, config)))
        .collect()
});

/// Resolve a language id (or alias) to its configuration
pub fn resolve(language_id: &str) -> Option<&'static LanguageConfig> {
    let key = language_id.trim().to_lowercase();
    BY_ALIAS.get(key.as_str()).copied()
}

/// Whether a grammar is registered for the given id
pub fn is_supported(language_id: &str) -> bool {
    resolve(language_id).is_some()
}

/// Canonical ids of every supported language, sorted
pub fn supported_languages() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = LANGUAGES.iter().map(|config| config.name).collect();
    names.sort_unstable();
    names
}

/// Every registry entry, in registration order
pub fn all() -> &'static [LanguageConfig] {
    LANGUAGES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(resolve("ts").unwrap().name, "typescript");
        assert_eq!(resolve("typescript").unwrap().name, "typescript");
        assert_eq!(resolve("py").unwrap().name, "python");
        assert_eq!(resolve("js").unwrap().name, "javascript");
        assert_eq!(resolve("javascript").unwrap().name, "javascript");
        assert_eq!(resolve("c++").unwrap().name, "cpp");
        assert_eq!(resolve("c#").unwrap().name, "csharp");
        assert_eq!(resolve("golang").unwrap().name, "go");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(resolve("RUST").unwrap().name, "rust");
        assert_eq!(resolve("Py").unwrap().name, "python");
        assert_eq!(resolve("  TSX ").unwrap().name, "tsx");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(resolve("unknown-lang-xyz").is_none());
        assert!(resolve("").is_none());
        assert!(!is_supported("cobol"));
    }

    #[test]
    fn test_supported_languages_sorted_and_unique() {
        let names = supported_languages();
        assert_eq!(names.len(), LANGUAGES.len());
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_aliases_are_unique_and_lowercase() {
        let mut seen = HashSet::new();
        for config in all() {
            assert!(config.aliases.contains(&config.name), "{}", config.name);
            for alias in config.aliases {
                assert_eq!(*alias, alias.to_lowercase());
                assert!(seen.insert(*alias), "duplicate alias {}", alias);
            }
        }
    }

    #[test]
    fn test_containers_are_splittable() {
        for config in all() {
            for kind in config.container_types {
                assert!(
                    config.is_splittable(kind),
                    "{}: container {} is not splittable",
                    config.name,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_node_types_exist_in_grammar() {
        for config in all() {
            let grammar = config.grammar();
            for kind in config.node_types {
                assert_ne!(
                    grammar.id_for_node_kind(kind, true),
                    0,
                    "{}: node kind {} is not produced by the grammar",
                    config.name,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_unmatched_node_kind_is_inert() {
        use crate::splitter::traverser::collect_candidates;

        const MADE_UP: &str = "telepathic_declaration";
        let rust = resolve("rust").unwrap();
        assert_eq!(rust.grammar().id_for_node_kind(MADE_UP, true), 0);

        let node_types: Vec<&'static str> =
            rust.node_types.iter().copied().chain([MADE_UP]).collect();
        let padded = LanguageConfig {
            name: rust.name,
            aliases: rust.aliases,
            grammar: rust.grammar,
            node_types: Box::leak(node_types.into_boxed_slice()),
            container_types: rust.container_types,
            family: rust.family,
        };

        let source = "struct Point {\n    x: i32,\n}\n\nimpl Point {\n    fn norm(&self) -> i32 {\n        self.x.abs()\n    }\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&rust.grammar()).unwrap();
        let tree = parser.parse(source, None).unwrap();

        let spans = |config: &LanguageConfig| -> Vec<(&'static str, usize, usize)> {
            collect_candidates(tree.root_node(), &lines, config)
                .into_iter()
                .map(|c| (c.kind, c.start_row, c.end_row))
                .collect()
        };
        let expected = spans(rust);
        assert_eq!(
            expected,
            vec![("struct_item", 0, 2), ("impl_item", 4, 8), ("function_item", 5, 7)]
        );
        assert_eq!(spans(&padded), expected);
    }

    #[test]
    fn test_every_grammar_loads_into_parser() {
        for config in all() {
            let mut parser = tree_sitter::Parser::new();
            assert!(
                parser.set_language(&config.grammar()).is_ok(),
                "{} grammar is incompatible with the parser",
                config.name
            );
        }
    }
}
