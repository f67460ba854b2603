//! End-to-end fetch scenarios against the in-memory result set.

use mysql_rowbind::mock::MockResultSet;
use mysql_rowbind::{
    BindingTable, ColumnBinder, ColumnState, ColumnValue, Error, FetchOptions, RowFetcher,
    ValueRef,
};

#[test]
fn test_text_column_grows_and_refetches() {
    let table = BindingTable::new(1);
    let mut source = MockResultSet::new().with_row([Some("hello world!")]);
    let mut text = String::new();
    {
        let mut fetcher = RowFetcher::new(&mut source, &table, FetchOptions::default());
        fetcher.bind(&mut text).unwrap();
        assert_eq!(table.get(0).unwrap().buffer_length(), 0);

        assert!(fetcher.next().unwrap());
        assert_eq!(fetcher.state(0), Some(ColumnState::Complete));

        let binding = table.get(0).unwrap();
        assert_eq!(binding.length(), 12);
        assert_eq!(binding.buffer_length(), 12);
        assert!(!binding.is_truncated());
        assert_eq!(
            fetcher.column(0).unwrap().value(),
            Some(ValueRef::Text("hello world!"))
        );
        assert!(!fetcher.next().unwrap());
    }
    assert_eq!(source.refetch_count(), 1);
    assert_eq!(text, "hello world!");
    assert_eq!(text.len(), 12);
}

#[test]
fn test_fixed_scalar_truncation_is_terminal() {
    let table = BindingTable::new(1);
    let mut source = MockResultSet::new().with_row([Some(vec![1u8, 2, 3, 4, 5, 6, 7, 8])]);
    let mut value = 0i32;
    {
        let mut fetcher = RowFetcher::new(&mut source, &table, FetchOptions::default());
        fetcher.bind(&mut value).unwrap();
        assert!(!fetcher.column(0).unwrap().is_dynamic());

        let err = fetcher.next().unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                column: 0,
                needed: 8,
                available: 4
            }
        ));
        assert!(!err.is_logic_error());
        assert_eq!(fetcher.state(0), Some(ColumnState::Truncated));
        assert_eq!(table.get(0).unwrap().buffer_length(), 4);
    }
    assert_eq!(source.refetch_count(), 0);
}

#[test]
fn test_bytes_column_that_fits_is_not_refetched() {
    let table = BindingTable::new(1);
    let data = b"0123456789".to_vec();
    let mut source = MockResultSet::new().with_row([Some(data.clone())]);
    let mut bytes = Vec::with_capacity(10);
    {
        let mut fetcher = RowFetcher::new(&mut source, &table, FetchOptions::default());
        fetcher.bind(&mut bytes).unwrap();
        assert!(fetcher.next().unwrap());
        assert_eq!(fetcher.state(0), Some(ColumnState::Complete));
    }
    assert_eq!(source.refetch_count(), 0);
    assert_eq!(bytes, data);
}

#[test]
fn test_resize_matches_reported_length() {
    for length in [1usize, 12, 255, 4096, 70_000] {
        let table = BindingTable::new(2);
        let mut text = String::new();
        let mut bytes = Vec::new();
        let mut text_binder = ColumnBinder::new(&mut text, table.get(0).unwrap()).unwrap();
        let mut bytes_binder = ColumnBinder::new(&mut bytes, table.get(1).unwrap()).unwrap();

        let data = vec![b'x'; length];
        text_binder.store(&data);
        bytes_binder.store(&data);
        text_binder.resize().unwrap();
        bytes_binder.resize().unwrap();

        for binder in [&text_binder, &bytes_binder] {
            assert_eq!(binder.binding().buffer_length(), length);
            let (address, size) = match binder.value().unwrap() {
                ValueRef::Text(s) => (s.as_ptr(), s.len()),
                ValueRef::Bytes(b) => (b.as_ptr(), b.len()),
                ValueRef::Fixed(_) => unreachable!(),
            };
            assert_eq!(size, length);
            assert_eq!(binder.buffer(), address);
        }
    }
}

#[test]
fn test_rows_grow_only_when_needed() {
    let table = BindingTable::with_names(["ID", "NAME", "DATA"]);
    let mut source = MockResultSet::new()
        .with_row([
            Some(1u64.to_ne_bytes().to_vec()),
            Some(b"ab".to_vec()),
            Some(vec![9; 3]),
        ])
        .with_row([
            Some(2u64.to_ne_bytes().to_vec()),
            Some(b"a".to_vec()),
            None,
        ])
        .with_row([
            Some(3u64.to_ne_bytes().to_vec()),
            Some(b"much longer name".to_vec()),
            Some(vec![7; 2]),
        ]);
    let mut id = 0u64;
    let mut name = String::new();
    let mut data = Vec::new();

    let rows = {
        let mut fetcher = RowFetcher::new(&mut source, &table, FetchOptions::default());
        fetcher
            .bind(&mut id)
            .unwrap()
            .bind(&mut name)
            .unwrap()
            .bind(&mut data)
            .unwrap();
        let rows = fetcher.fetch_all().unwrap();
        assert_eq!(fetcher.rowcount(), 3);
        assert!(fetcher.is_exhausted());
        rows
    };

    // Row 1 grows NAME and DATA, row 3 grows NAME again.
    assert_eq!(source.refetch_count(), 3);
    assert_eq!(source.fetch_count(), 4);

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0].get_by_name("id"),
        Some(&ColumnValue::Fixed(1u64.to_ne_bytes().to_vec()))
    );
    assert_eq!(rows[1].get(1).and_then(|v| v.as_str()), Some("a"));
    assert!(rows[1].get_by_name("data").unwrap().is_null());
    assert_eq!(rows[2].get(1).and_then(|v| v.as_str()), Some("much longer name"));
    assert_eq!(rows[2].get(2), Some(&ColumnValue::Bytes(vec![7, 7])));

    assert_eq!(id, 3);
    assert_eq!(name, "much longer name");
    assert_eq!(data, vec![7, 7]);
}

#[test]
fn test_invalid_text_fails_row() {
    let table = BindingTable::new(1);
    let source = MockResultSet::new().with_row([Some(vec![0xc3, 0x28])]);
    let mut text = String::new();
    let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
    fetcher.bind(&mut text).unwrap();
    assert!(matches!(
        fetcher.next(),
        Err(Error::InvalidText { column: 0, .. })
    ));
}

#[test]
fn test_bindings_reusable_after_fetcher_drop() {
    let table = BindingTable::new(1);
    let mut first = String::new();
    let mut second = Vec::new();
    {
        let source = MockResultSet::new().with_row([Some("one")]);
        let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
        fetcher.bind(&mut first).unwrap();
        assert!(fetcher.next().unwrap());
    }
    assert!(!table.get(0).unwrap().is_attached());
    {
        let source = MockResultSet::new().with_row([Some("two")]);
        let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
        fetcher.bind(&mut second).unwrap();
        assert!(fetcher.next().unwrap());
    }
    assert_eq!(first, "one");
    assert_eq!(second, b"two");
}

#[test]
fn test_short_scalar_fails_row() {
    let table = BindingTable::new(1);
    let source = MockResultSet::new()
        .with_row([Some(9i32.to_ne_bytes().to_vec())])
        .with_row([Some(vec![1u8, 2])]);
    let mut value = 0i32;
    let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
    fetcher.bind(&mut value).unwrap();

    assert!(fetcher.next().unwrap());
    assert_eq!(
        fetcher.current_row().get(0),
        Some(&ColumnValue::Fixed(9i32.to_ne_bytes().to_vec()))
    );
    assert!(matches!(fetcher.next(), Err(Error::Protocol { .. })));
    assert_eq!(fetcher.rowcount(), 1);
}

#[test]
fn test_leaked_binder_never_releases_binding() {
    let table = BindingTable::new(1);
    {
        let mut scratch = Vec::with_capacity(16);
        let binder = ColumnBinder::new(&mut scratch, table.get(0).unwrap()).unwrap();
        std::mem::forget(binder);
    }
    assert!(table.get(0).unwrap().is_attached());

    let source = MockResultSet::new().with_row([Some("OVERWRITTEN!!!!!")]);
    let mut text = String::new();
    let mut fetcher = RowFetcher::new(source, &table, FetchOptions::default());
    assert!(matches!(
        fetcher.bind(&mut text),
        Err(Error::AlreadyBound { column: 0 })
    ));
    assert!(matches!(
        fetcher.next(),
        Err(Error::ColumnCountMismatch {
            expected: 1,
            bound: 0
        })
    ));
}
