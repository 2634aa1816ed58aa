//! Round-trip tests across the three supported encodings.
//!
//! Every source variant must survive TOML, JSON and YAML losslessly, and
//! all encodings must agree on the canonical printed form and hash.

use pakt_source::Source;

fn all_variants() -> Vec<Source> {
    vec![
        Source::Empty,
        Source::Git {
            url: "https://example.com/repo.git".to_string(),
            tag: "v1.2.3".to_string(),
            branch: String::new(),
            commit: String::new(),
        },
        Source::Git {
            url: "https://example.com/repo.git".to_string(),
            tag: String::new(),
            branch: String::new(),
            commit: "0123456789abcdef".to_string(),
        },
        Source::Hg {
            url: "https://hg.example.com/repo".to_string(),
            tag: String::new(),
            branch: String::new(),
            commit: String::new(),
            revision: 42,
        },
        Source::Bzr {
            url: "https://bzr.example.com/repo".to_string(),
            tag: "release-1.0".to_string(),
            revision: -1,
        },
        Source::Fossil {
            url: "https://fossil.example.com/repo".to_string(),
            tag: String::new(),
            branch: "trunk".to_string(),
            commit: String::new(),
        },
        Source::Cvs {
            url: ":pserver:anonymous@cvs.example.com:/cvsroot".to_string(),
            module: "proj".to_string(),
            tag: "REL_1_0".to_string(),
            branch: String::new(),
            revision: String::new(),
        },
        Source::Svn {
            url: "https://svn.example.com/repo".to_string(),
            tag: String::new(),
            branch: String::new(),
            revision: 1234,
        },
        Source::RemoteFile {
            url: "https://example.com/pkg-{v}.tar.gz".to_string(),
        },
        Source::RemoteFiles {
            urls: ["https://example.com/a.h", "https://example.com/b.h"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        },
    ]
}

#[test]
fn json_round_trip() {
    for src in all_variants() {
        let text = serde_json::to_string(&src).unwrap();
        let back: Source = serde_json::from_str(&text).unwrap();
        assert_eq!(back, src, "json round-trip for {}", src.kind());
    }
}

#[test]
fn toml_round_trip() {
    for src in all_variants() {
        let text = toml::to_string(&src).unwrap();
        let back: Source = toml::from_str(&text).unwrap();
        assert_eq!(back, src, "toml round-trip for {}", src.kind());
    }
}

#[test]
fn yaml_round_trip() {
    for src in all_variants() {
        let text = serde_yml::to_string(&src).unwrap();
        let back: Source = serde_yml::from_str(&text).unwrap();
        assert_eq!(back, src, "yaml round-trip for {}", src.kind());
    }
}

#[test]
fn encodings_agree_on_print_and_hash() {
    for src in all_variants() {
        let json: Source = serde_json::from_str(&serde_json::to_string(&src).unwrap()).unwrap();
        let toml_: Source = toml::from_str(&toml::to_string(&src).unwrap()).unwrap();
        let yaml: Source = serde_yml::from_str(&serde_yml::to_string(&src).unwrap()).unwrap();

        assert_eq!(json.print(), src.print());
        assert_eq!(toml_.print(), src.print());
        assert_eq!(yaml.print(), src.print());
        assert_eq!(json.source_hash(), src.source_hash());
        assert_eq!(toml_.source_hash(), src.source_hash());
        assert_eq!(yaml.source_hash(), src.source_hash());
    }
}

#[test]
fn defaults_do_not_leak_into_serial_form() {
    let src = Source::Git {
        url: "https://example.com/repo.git".to_string(),
        tag: String::new(),
        branch: String::new(),
        commit: String::new(),
    };
    let json = serde_json::to_string(&src).unwrap();
    assert!(!json.contains("tag"));
    assert!(!json.contains("branch"));
    assert!(!json.contains("commit"));
}
