//! End-to-end tagging: cache merge, resolution, classification, positions

use std::collections::BTreeSet;
use std::path::Path;
use taglight_core::{
    DirSources, GoResolver, LineIndex, MemorySources, Position, Project, TagRecord,
    resolve_package, tag_file,
};

fn tag(project: &mut Project, path: &Path, content: &str) -> Vec<TagRecord> {
    let package = project
        .merge_active_file(path, content.as_bytes().to_vec())
        .expect("merge failed");
    let files = package.files();
    let active = package.file_index(path).expect("active file not in package");
    let index = resolve_package(&mut GoResolver::new(), &files);
    tag_file(&index, active, &files[active].lines)
}

fn single_file_project() -> Project {
    Project::load(
        "/proj",
        MemorySources::new().add("/proj/a.go", "package p\n"),
    )
    .unwrap()
}

fn kinds(records: &[TagRecord], name: &str) -> BTreeSet<char> {
    records
        .iter()
        .filter(|r| r.name == name)
        .map(|r| r.kind.as_char())
        .collect()
}

#[test]
fn test_constant_declaration() {
    let mut project = single_file_project();
    let records = tag(&mut project, Path::new("/proj/a.go"), "package p\nconst X = 1\n");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.kind.as_char(), 'c');
    assert_eq!(record.start_line, 1);
    assert_eq!(record.start_col, 7);
    assert_eq!(record.name, "X");
    assert_eq!(record.name_len, 1);
}

#[test]
fn test_function_declaration() {
    let mut project = single_file_project();
    let records = tag(&mut project, Path::new("/proj/a.go"), "package p\nfunc F() {}\n");
    assert_eq!(kinds(&records, "F"), BTreeSet::from(['f']));
}

#[test]
fn test_local_variables_are_not_tagged() {
    let mut project = single_file_project();
    let records = tag(
        &mut project,
        Path::new("/proj/a.go"),
        "package p\nfunc F() { var x int; _ = x }\n",
    );
    assert!(kinds(&records, "x").is_empty());
    assert_eq!(kinds(&records, "F"), BTreeSet::from(['f']));
    assert_eq!(kinds(&records, "int"), BTreeSet::from(['t']));
}

#[test]
fn test_valid_prefix_survives_syntax_error() {
    let mut project = single_file_project();
    let records = tag(
        &mut project,
        Path::new("/proj/a.go"),
        "package p\nconst X = 1\n\nfunc F( {\n",
    );
    assert_eq!(kinds(&records, "X"), BTreeSet::from(['c']));
}

#[test]
fn test_second_update_replaces_first() {
    let mut project = single_file_project();
    let path = Path::new("/proj/a.go");
    tag(&mut project, path, "package p\nconst X = 1\n");
    let records = tag(&mut project, path, "package p\nconst Y = 2\n");
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Y"]);
}

#[test]
fn test_identical_content_gives_identical_records() {
    let source = "package p\ntype T struct{ A int }\nfunc (t T) M() int { return t.A }\n";
    let mut project = single_file_project();
    let path = Path::new("/proj/a.go");
    let first = tag(&mut project, path, source);
    let second = tag(&mut project, path, source);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

const SHAPES: &str = r#"package shapes

import (
	"fmt"
	str "strings"
)

type Shape interface {
	Area() float64
}

type Rect struct {
	W, H float64
}

type Meters float64

var Registry = map[string]Shape{}

func (r Rect) Area() float64 { return r.W * r.H }

func Describe(s Shape) string {
	return fmt.Sprint(s.Area()) + str.ToUpper("x")
}
"#;

#[test]
fn test_every_kind_is_reported() {
    let mut project = Project::load(
        "/shapes",
        MemorySources::new().add("/shapes/shapes.go", "package shapes\n"),
    )
    .unwrap();
    let records = tag(&mut project, Path::new("/shapes/shapes.go"), SHAPES);

    assert_eq!(kinds(&records, "Shape"), BTreeSet::from(['i']));
    assert_eq!(kinds(&records, "Area"), BTreeSet::from(['F']));
    assert_eq!(kinds(&records, "Rect"), BTreeSet::from(['s']));
    assert_eq!(kinds(&records, "W"), BTreeSet::from(['m']));
    assert_eq!(kinds(&records, "Meters"), BTreeSet::from(['t']));
    assert_eq!(kinds(&records, "float64"), BTreeSet::from(['t']));
    assert_eq!(kinds(&records, "Registry"), BTreeSet::from(['v']));
    assert_eq!(kinds(&records, "Describe"), BTreeSet::from(['f']));
    assert_eq!(kinds(&records, "fmt"), BTreeSet::from(['p']));
    assert_eq!(kinds(&records, "str"), BTreeSet::from(['p']));

    // interface method, concrete method, and the call through the interface
    assert_eq!(records.iter().filter(|r| r.name == "Area").count(), 3);
    // r.W and r.H are uses of the fields
    assert_eq!(records.iter().filter(|r| r.name == "W").count(), 2);

    for name in ["r", "s", "Sprint", "ToUpper"] {
        assert!(kinds(&records, name).is_empty(), "{name} should not be tagged");
    }
}

#[test]
fn test_records_stay_inside_active_file() {
    let mut project = Project::load(
        "/proj",
        MemorySources::new()
            .add("/proj/a.go", "package p\n")
            .add(
                "/proj/b.go",
                "package p\n\ntype Config struct{ Name string }\n\nconst Version = 2\n",
            ),
    )
    .unwrap();

    let source = "package p\n\nfunc Load() Config {\n\treturn Config{Name: \"v\"}\n}\n\nvar current = Version\n";
    let records = tag(&mut project, Path::new("/proj/a.go"), source);
    let lines = LineIndex::new(source.as_bytes());

    assert!(!records.is_empty());
    for record in &records {
        let offset = lines
            .offset(Position::new(record.start_line + 1, record.start_col))
            .expect("record outside the active file");
        assert_eq!(&source[offset..offset + record.name_len], record.name);
    }
    assert_eq!(kinds(&records, "Config"), BTreeSet::from(['s']));
    assert_eq!(kinds(&records, "Name"), BTreeSet::from(['m']));
    assert_eq!(kinds(&records, "Version"), BTreeSet::from(['c']));
}

#[test]
fn test_records_are_sorted_and_names_are_safe() {
    let mut project = single_file_project();
    let records = tag(&mut project, Path::new("/proj/a.go"), SHAPES);
    let positions: Vec<_> = records.iter().map(|r| (r.start_line, r.start_col)).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
    assert!(
        records
            .iter()
            .all(|r| !r.name.contains('\t') && !r.name.contains('\n'))
    );
}

#[test]
fn test_project_loaded_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("lib.go"),
        "package lib\n\nfunc Helper() int { return 1 }\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("main.go"), "package lib\n").unwrap();

    let mut project = Project::load(dir.path(), DirSources::new(dir.path())).unwrap();
    let main = dir.path().join("main.go");
    let records = tag(
        &mut project,
        &main,
        "package lib\n\nvar answer = Helper()\n",
    );
    assert_eq!(kinds(&records, "Helper"), BTreeSet::from(['f']));
    assert_eq!(kinds(&records, "answer"), BTreeSet::from(['v']));
}

#[test]
fn test_long_expression_chain() {
    let terms = 50_000;
    let source = format!(
        "package p\n\nconst X = 1\n\nvar Y = {}\n",
        vec!["X"; terms].join("+")
    );
    let mut project = single_file_project();
    let records = tag(&mut project, Path::new("/proj/a.go"), &source);

    assert_eq!(records.len(), terms + 2);
    assert_eq!(kinds(&records, "X"), BTreeSet::from(['c']));
    assert_eq!(kinds(&records, "Y"), BTreeSet::from(['v']));
}

#[test]
fn test_type_parameters_are_tagged_as_interfaces() {
    let mut project = single_file_project();
    let records = tag(
        &mut project,
        Path::new("/proj/a.go"),
        "package p\n\nfunc F[T any](x T) T { return x }\n\ntype Set[K comparable] map[K]bool\n",
    );
    assert_eq!(kinds(&records, "T"), BTreeSet::from(['i']));
    assert_eq!(kinds(&records, "K"), BTreeSet::from(['i']));
    assert_eq!(kinds(&records, "Set"), BTreeSet::from(['t']));
}
