//! Parquet reading and writing for record tables
//!
//! Integer columns are widened to `Int64` and floating point or decimal
//! columns to `Float64`. Any other type (dates, timestamps, dictionaries)
//! is cast to text, which is all the pipeline needs from those columns.

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use featx_core::{Column, ColumnData, Error, RecordTable, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Prefix of the index columns pandas writes for non-default indexes
const PANDAS_INDEX_PREFIX: &str = "__index_level_";

fn storage_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Storage(e.to_string())
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Storage(format!("Failed to downcast column '{}'", name)))
}

fn array_to_column_data(name: &str, array: &ArrayRef) -> Result<ColumnData> {
    match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let casted = cast(array, &DataType::Int64).map_err(storage_err)?;
            let values = downcast::<Int64Array>(&casted, name)?;
            Ok(ColumnData::Int64(values.iter().collect()))
        }
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let casted = cast(array, &DataType::Float64).map_err(storage_err)?;
            let values = downcast::<Float64Array>(&casted, name)?;
            Ok(ColumnData::Float64(values.iter().collect()))
        }
        DataType::Boolean => {
            let values = downcast::<BooleanArray>(array, name)?;
            Ok(ColumnData::Boolean(values.iter().collect()))
        }
        DataType::Null => Ok(ColumnData::Utf8(vec![None; array.len()])),
        _ => {
            let casted = cast(array, &DataType::Utf8).map_err(storage_err)?;
            let values = downcast::<StringArray>(&casted, name)?;
            Ok(ColumnData::Utf8(
                values.iter().map(|v| v.map(str::to_string)).collect(),
            ))
        }
    }
}

fn column_to_array(column: &Column) -> (DataType, ArrayRef) {
    match column.data() {
        ColumnData::Int64(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
        ColumnData::Float64(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
        ColumnData::Boolean(v) => (DataType::Boolean, Arc::new(BooleanArray::from(v.clone()))),
        ColumnData::Utf8(v) => (DataType::Utf8, Arc::new(StringArray::from(v.clone()))),
    }
}

/// Load a whole parquet file into memory
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<RecordTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(storage_err)?;
    let schema = builder.schema().clone();
    let reader = builder.build().map_err(storage_err)?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(storage_err)?;
    let batch = concat_batches(&schema, &batches).map_err(storage_err)?;

    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if field.name().starts_with(PANDAS_INDEX_PREFIX) {
            continue;
        }
        let data = array_to_column_data(field.name(), array)?;
        columns.push(Column::new(field.name().clone(), data));
    }

    let table = RecordTable::from_columns(columns)?;
    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Write a table as a single snappy-compressed parquet file, replacing any
/// existing file
pub fn write_parquet<P: AsRef<Path>>(table: &RecordTable, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = table
        .columns()
        .iter()
        .map(|column| {
            let (data_type, array) = column_to_array(column);
            (Field::new(column.name(), data_type, true), array)
        })
        .unzip();

    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.n_rows()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)
        .map_err(storage_err)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(storage_err)?;
    writer.write(&batch).map_err(storage_err)?;
    writer.close().map_err(storage_err)?;

    info!(
        "Wrote {} rows x {} columns to {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(())
}
