//! The closed set of remote operations and their declared shapes.
//!
//! The list lives in one place, [`for_each_operation!`], and every
//! per-operation surface (catalog, server trait, client facades) is generated
//! from it by a callback macro.

use crate::error::ShapeError;
use crate::value::{check_kinds, Marshal, Returns, Value, ValueKind};

/// Name, parameter kinds and result kinds of one remote operation
///
/// `results` lists the success values only; the failure indicator is the
/// error side of the call's outcome and is implied for every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub params: &'static [ValueKind],
    pub results: &'static [ValueKind],
}

impl OperationDescriptor {
    /// Resolve an operation by its wire name
    pub fn lookup(name: &str) -> Option<&'static OperationDescriptor> {
        OPERATIONS.iter().find(|op| op.name == name)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn check_args(&self, args: &[Value]) -> Result<(), ShapeError> {
        check_kinds(args, self.params)
    }

    pub fn check_results(&self, values: &[Value]) -> Result<(), ShapeError> {
        check_kinds(values, self.results)
    }
}

/// Invokes `$m!` with the full operation list.
///
/// Each entry reads `fn rust_name = "wireName" (arg: Type, ...) -> Return;`
/// where `Return` is `()` or a single [`Marshal`](crate::value::Marshal) type.
#[macro_export]
macro_rules! for_each_operation {
    ($m:ident) => {
        $m! {
            /// Appends values to one or more columns within a single row and
            /// returns the column values after the append.
            fn append = "append" (append: $crate::types::Append) -> ::std::vec::Vec<$crate::types::Cell>;
            /// Atomically increments a column and returns the new value.
            fn atomic_increment = "atomicIncrement" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, value: i64) -> i64;
            /// Puts `mput` only if the column currently holds `value`; returns
            /// whether the put was applied.
            fn check_and_put = "checkAndPut" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, value: $crate::types::Text, mput: $crate::types::Mutation, attributes: $crate::types::Attributes) -> bool;
            fn compact = "compact" (table_name_or_region_name: $crate::types::Bytes) -> ();
            fn create_table = "createTable" (table_name: $crate::types::Text, column_families: ::std::vec::Vec<$crate::types::ColumnDescriptor>) -> ();
            fn delete_all = "deleteAll" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, attributes: $crate::types::Attributes) -> ();
            fn delete_all_row = "deleteAllRow" (table_name: $crate::types::Text, row: $crate::types::Text, attributes: $crate::types::Attributes) -> ();
            fn delete_all_row_ts = "deleteAllRowTs" (table_name: $crate::types::Text, row: $crate::types::Text, timestamp: i64, attributes: $crate::types::Attributes) -> ();
            fn delete_all_ts = "deleteAllTs" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, timestamp: i64, attributes: $crate::types::Attributes) -> ();
            fn delete_table = "deleteTable" (table_name: $crate::types::Text) -> ();
            fn disable_table = "disableTable" (table_name: $crate::types::Bytes) -> ();
            fn enable_table = "enableTable" (table_name: $crate::types::Bytes) -> ();
            fn get = "get" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::Cell>;
            fn get_column_descriptors = "getColumnDescriptors" (table_name: $crate::types::Text) -> ::std::collections::BTreeMap<$crate::types::Text, $crate::types::ColumnDescriptor>;
            fn get_region_info = "getRegionInfo" (row: $crate::types::Text) -> $crate::types::RegionInfo;
            fn get_row = "getRow" (table_name: $crate::types::Text, row: $crate::types::Text, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_row_or_before = "getRowOrBefore" (table_name: $crate::types::Text, row: $crate::types::Text, family: $crate::types::Text) -> ::std::vec::Vec<$crate::types::Cell>;
            fn get_row_ts = "getRowTs" (table_name: $crate::types::Text, row: $crate::types::Text, timestamp: i64, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_row_with_columns = "getRowWithColumns" (table_name: $crate::types::Text, row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_row_with_columns_ts = "getRowWithColumnsTs" (table_name: $crate::types::Text, row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, timestamp: i64, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_rows = "getRows" (table_name: $crate::types::Text, rows: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_rows_ts = "getRowsTs" (table_name: $crate::types::Text, rows: ::std::vec::Vec<$crate::types::Text>, timestamp: i64, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_rows_with_columns = "getRowsWithColumns" (table_name: $crate::types::Text, rows: ::std::vec::Vec<$crate::types::Text>, columns: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_rows_with_columns_ts = "getRowsWithColumnsTs" (table_name: $crate::types::Text, rows: ::std::vec::Vec<$crate::types::Text>, columns: ::std::vec::Vec<$crate::types::Text>, timestamp: i64, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn get_table_names = "getTableNames" () -> ::std::vec::Vec<$crate::types::Text>;
            fn get_table_regions = "getTableRegions" (table_name: $crate::types::Text) -> ::std::vec::Vec<$crate::types::RegionInfo>;
            fn get_ver = "getVer" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, num_versions: i32, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::Cell>;
            fn get_ver_ts = "getVerTs" (table_name: $crate::types::Text, row: $crate::types::Text, column: $crate::types::Text, timestamp: i64, num_versions: i32, attributes: $crate::types::Attributes) -> ::std::vec::Vec<$crate::types::Cell>;
            fn increment = "increment" (increment: $crate::types::Increment) -> ();
            fn increment_rows = "incrementRows" (increments: ::std::vec::Vec<$crate::types::Increment>) -> ();
            fn is_table_enabled = "isTableEnabled" (table_name: $crate::types::Bytes) -> bool;
            fn major_compact = "majorCompact" (table_name_or_region_name: $crate::types::Bytes) -> ();
            fn mutate_row = "mutateRow" (table_name: $crate::types::Text, row: $crate::types::Text, mutations: ::std::vec::Vec<$crate::types::Mutation>, attributes: $crate::types::Attributes) -> ();
            fn mutate_row_ts = "mutateRowTs" (table_name: $crate::types::Text, row: $crate::types::Text, mutations: ::std::vec::Vec<$crate::types::Mutation>, timestamp: i64, attributes: $crate::types::Attributes) -> ();
            fn mutate_rows = "mutateRows" (table_name: $crate::types::Text, row_batches: ::std::vec::Vec<$crate::types::BatchMutation>, attributes: $crate::types::Attributes) -> ();
            fn mutate_rows_ts = "mutateRowsTs" (table_name: $crate::types::Text, row_batches: ::std::vec::Vec<$crate::types::BatchMutation>, timestamp: i64, attributes: $crate::types::Attributes) -> ();
            fn scanner_close = "scannerClose" (id: $crate::types::ScannerId) -> ();
            fn scanner_get = "scannerGet" (id: $crate::types::ScannerId) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn scanner_get_list = "scannerGetList" (id: $crate::types::ScannerId, nb_rows: i32) -> ::std::vec::Vec<$crate::types::RowResult>;
            fn scanner_open = "scannerOpen" (table_name: $crate::types::Text, start_row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
            fn scanner_open_ts = "scannerOpenTs" (table_name: $crate::types::Text, start_row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, timestamp: i64, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
            fn scanner_open_with_prefix = "scannerOpenWithPrefix" (table_name: $crate::types::Text, start_and_prefix: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
            fn scanner_open_with_scan = "scannerOpenWithScan" (table_name: $crate::types::Text, scan: $crate::types::Scan, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
            fn scanner_open_with_stop = "scannerOpenWithStop" (table_name: $crate::types::Text, start_row: $crate::types::Text, stop_row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
            fn scanner_open_with_stop_ts = "scannerOpenWithStopTs" (table_name: $crate::types::Text, start_row: $crate::types::Text, stop_row: $crate::types::Text, columns: ::std::vec::Vec<$crate::types::Text>, timestamp: i64, attributes: $crate::types::Attributes) -> $crate::types::ScannerId;
        }
    };
}

macro_rules! define_catalog {
    ($($(#[$meta:meta])* fn $fn:ident = $name:literal ($($arg:ident : $ty:ty),*) -> $ret:ty;)*) => {
        /// Every operation the storage service exposes
        pub static OPERATIONS: &[OperationDescriptor] = &[
            $(OperationDescriptor {
                name: $name,
                params: &[$(<$ty as Marshal>::KIND),*],
                results: <$ret as Returns>::KINDS,
            },)*
        ];
    };
}

crate::for_each_operation!(define_catalog);
