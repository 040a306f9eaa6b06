//! End-to-end CSV loading through `DuckDB`.

use std::fs;

use pretty_assertions::assert_eq;
use sleuth_core::capability::DatasetSource;
use sleuth_core::dataset::CellValue;
use sleuth_core::enums::ColumnType;
use sleuth_lake::{DatasetStore, LakeError};

const SALES: &str = "\
Sale ID,Product,Turnover,Paid,Sale Date
1,Widget,10.5,true,2024-01-03
2,Widget,12.0,false,2024-01-04
3,Gadget,,true,2024-01-05
4,Widget,9.25,true,2024-01-06
5,Widget,11.0,false,2024-01-07
6,Gadget,10.0,true,2024-01-08
7,Widget,10.75,true,2024-01-09
8,Widget,10.0,false,2024-01-10
9,Gadget,13.5,true,2024-01-11
10,Widget,10.0,true,2024-01-12
";

fn store_with(name: &str, content: &str) -> (tempfile::TempDir, DatasetStore) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(name), content).unwrap();
    let store = DatasetStore::open_in_memory(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn loads_csv_by_identifier() {
    let (_dir, store) = store_with("sales.csv", SALES);
    let ds = store.load_dataset("sales").unwrap();

    assert_eq!(ds.id(), "sales");
    assert_eq!(ds.row_count(), 10);
    assert_eq!(ds.column_count(), 5);

    let types = ds.column_types();
    assert_eq!(types["Sale ID"], ColumnType::Numeric);
    assert_eq!(types["Product"], ColumnType::Categorical);
    assert_eq!(types["Turnover"], ColumnType::Numeric);
    assert_eq!(types["Paid"], ColumnType::Boolean);
    assert_eq!(types["Sale Date"], ColumnType::Date);
}

#[test]
fn empty_cells_load_as_null() {
    let (_dir, store) = store_with("sales.csv", SALES);
    let ds = store.load_dataset("sales").unwrap();
    let turnover = ds.column_index("Turnover").unwrap();

    assert_eq!(ds.rows()[2][turnover], CellValue::Null);
    assert_eq!(ds.rows()[0][turnover], CellValue::Float(10.5));
}

#[test]
fn dates_render_as_iso_text() {
    let (_dir, store) = store_with("sales.csv", SALES);
    let ds = store.load_dataset("sales").unwrap();
    let date = ds.column_index("Sale Date").unwrap();
    assert_eq!(ds.rows()[0][date], CellValue::Text("2024-01-03".into()));
}

#[test]
fn explicit_path_is_accepted() {
    let (dir, store) = store_with("other.csv", SALES);
    let path = dir.path().join("other.csv");
    let ds = store.load_dataset(path.to_str().unwrap()).unwrap();
    assert_eq!(ds.id(), "other");
}

#[test]
fn unknown_extension_is_unsupported() {
    let (_dir, store) = store_with("sales.xlsx", "binary");
    let err = store.load_dataset("sales.xlsx").unwrap_err();
    assert!(matches!(err, LakeError::Unsupported(_)));
}
