use crate::{LookupResult, LookupTable, OwnedTable, TableError, build_table, compute_table_size};

/// Build `codepoints` into a buffer that is deliberately larger than needed.
fn pack_table(codepoints: &[u32]) -> Vec<u8> {
    let size = compute_table_size(codepoints).unwrap();
    let mut buffer = vec![0xFE; size + 64];
    let table = build_table(&mut buffer, codepoints).unwrap();
    assert_eq!(table.as_bytes().len(), size);
    buffer.truncate(size);
    buffer
}

fn offsets(table_bytes: &[u8], input: &[u8]) -> Vec<u32> {
    let table = LookupTable::from_bytes(table_bytes).unwrap();
    let (_, results) = table.lookup(input, 128);
    results.iter().map(|r| r.offset).collect()
}

const OCTET_2_SET: [u32; 7] = [130, 165, 228, 229, 246, 0x7CF, 0x7FF];
const OCTET_3_SET: [u32; 4] = [0x800, 0x1024, 0x1025, 0xFFFF];
const OCTET_4_SET: [u32; 4] = [0x10000, 0x10801, 0x10802, 0x10FFFF];

// å ä ö ¥ U+07CF U+07FF, then § which is missing
const OCTET_2_TEXT: &[u8] = b"\xc3\xa5\xc3\xa4\xc3\xb6\xc2\xa5\xdf\x8f\xdf\xbf\xc2\xa7";
// U+0800 U+1024 U+1025 U+FFFF, then U+2048 which is missing
const OCTET_3_TEXT: &[u8] = b"\xe0\xa0\x80\xe1\x80\xa4\xe1\x80\xa5\xef\xbf\xbf\xe2\x81\x88";
// U+10000 U+10801 U+10802 U+10FFFF, then U+10803 which shares three bytes with U+10801
const OCTET_4_TEXT: &[u8] = b"\xf0\x90\x80\x80\xf0\x90\xa0\x81\xf0\x90\xa0\x82\xf4\x8f\xbf\xbf\xf0\x90\xa0\x83";

#[test]
fn test_octet_1_simple() {
    let table = pack_table(&['\n' as u32, '%' as u32]);
    assert_eq!(offsets(&table, b"%d"), vec![2, 0]);
}

#[test]
fn test_octet_1() {
    let set: Vec<u32> = "%6BXab".chars().map(u32::from).collect();
    let table = pack_table(&set);
    assert_eq!(offsets(&table, b"BX%6abd"), vec![3, 4, 1, 2, 5, 6, 0]);
}

#[test]
fn test_octet_1_complete() {
    let set: Vec<u32> = (1..=127).collect();
    let table = pack_table(&set);

    // 127 down to 1, then the terminating NUL
    let text: Vec<u8> = (0..128).map(|i| (127 - i) as u8).collect();
    let found = offsets(&table, &text);
    assert_eq!(found.len(), 127);
    for (i, &offset) in found.iter().enumerate() {
        assert_eq!(offset, 127 - i as u32);
    }

    // multi-byte input against a single-byte table
    assert_eq!(offsets(&table, "åäö¥€🦀".as_bytes()), vec![0; 6]);
}

#[test]
fn test_octet_2() {
    let table = pack_table(&OCTET_2_SET);
    assert_eq!(offsets(&table, OCTET_2_TEXT), vec![4, 3, 5, 2, 6, 7, 0]);
}

#[test]
fn test_octet_3() {
    let table = pack_table(&OCTET_3_SET);
    assert_eq!(offsets(&table, OCTET_3_TEXT), vec![1, 2, 3, 4, 0]);
}

#[test]
fn test_octet_3_distinct_first_bytes() {
    let table = pack_table(&[0x2026, 0x300F, 0x7B2C]);
    let text = b"\xe2\x80\xa6\xe3\x80\x8f\xe7\xac\xac\xe2\x81\x88";
    assert_eq!(offsets(&table, text), vec![1, 2, 3, 0]);
}

#[test]
fn test_octet_2_then_3_sharing_first_group() {
    // U+00A0 and U+2026 both have first group 2
    let table = pack_table(&[0xA0, 0x2026]);
    let text = b"\xc2\xa0\xe2\x80\xa6\xe2\x81\x88";
    assert_eq!(offsets(&table, text), vec![1, 2, 0]);
}

#[test]
fn test_octet_4() {
    let table = pack_table(&OCTET_4_SET);
    assert_eq!(offsets(&table, OCTET_4_TEXT), vec![1, 2, 3, 4, 0]);
}

#[test]
fn test_octet_1_and_2() {
    let table = pack_table(&['a' as u32, 228]);
    assert_eq!(offsets(&table, "aä".as_bytes()), vec![1, 2]);
}

#[test]
fn test_octet_1_and_3() {
    let mut set: Vec<u32> = "%6BXab".chars().map(u32::from).collect();
    set.extend(OCTET_3_SET);
    let table = pack_table(&set);

    let mut text = b"BaXb6%".to_vec();
    text.extend_from_slice(OCTET_3_TEXT);
    assert_eq!(offsets(&table, &text), vec![3, 5, 4, 6, 2, 1, 7, 8, 9, 10, 0]);
}

#[test]
fn test_octet_2_and_3() {
    let mut set = OCTET_2_SET.to_vec();
    set.extend(OCTET_3_SET);
    let table = pack_table(&set);

    let text = [OCTET_2_TEXT, OCTET_3_TEXT].concat();
    assert_eq!(offsets(&table, &text), vec![4, 3, 5, 2, 6, 7, 0, 8, 9, 10, 11, 0]);
}

#[test]
fn test_octet_1_2_and_3() {
    let mut set: Vec<u32> = "ABbd".chars().map(u32::from).collect();
    set.extend(OCTET_2_SET);
    set.extend(OCTET_3_SET);
    let table = pack_table(&set);

    let text = [b"dbBAq".as_slice(), OCTET_2_TEXT, OCTET_3_TEXT].concat();
    assert_eq!(
        offsets(&table, &text),
        vec![4, 3, 2, 1, 0, 8, 7, 9, 6, 10, 11, 0, 12, 13, 14, 15, 0]
    );
}

#[test]
fn test_octet_1_2_3_and_4() {
    let mut set: Vec<u32> = "ABbd".chars().map(u32::from).collect();
    set.extend(OCTET_2_SET);
    set.extend(OCTET_3_SET);
    set.extend(OCTET_4_SET);
    let table = pack_table(&set);

    let text = [b"dbBAq".as_slice(), OCTET_2_TEXT, OCTET_3_TEXT, OCTET_4_TEXT].concat();
    assert_eq!(
        offsets(&table, &text),
        vec![
            4, 3, 2, 1, 0, // single byte, q missing
            8, 7, 9, 6, 10, 11, 0, // two bytes, § missing
            12, 13, 14, 15, 0, // three bytes
            16, 17, 18, 19, 0, // four bytes
        ]
    );
}

#[test]
fn test_empty_set_resolves_nothing() {
    let table = pack_table(&[]);
    assert_eq!(offsets(&table, "a€🦀".as_bytes()), vec![0, 0, 0]);
}

#[test]
fn test_full_single_byte_range_including_nul() {
    let set: Vec<u32> = (0..=0x7F).collect();
    let table = pack_table(&set);
    let view = LookupTable::from_bytes(&table).unwrap();
    for cp in 0..=0x7F {
        assert_eq!(view.offset_of(cp), cp + 1);
    }
}

#[test]
fn test_result_buffer_is_filled_in_order() {
    let table = pack_table(&OCTET_3_SET);
    let view = LookupTable::from_bytes(&table).unwrap();
    let mut results = [LookupResult::default(); 3];
    let progress = view.lookup_into(OCTET_3_TEXT, &mut results);
    assert_eq!(progress.written, 3);
    assert_eq!(progress.consumed, 9);
    assert_eq!(
        results,
        [
            LookupResult { position: 0, offset: 1 },
            LookupResult { position: 3, offset: 2 },
            LookupResult { position: 6, offset: 3 },
        ]
    );
}

#[test]
fn test_equal_inputs_give_identical_tables() {
    let mut set = OCTET_2_SET.to_vec();
    set.extend(OCTET_4_SET);
    assert_eq!(pack_table(&set), pack_table(&set));
}

#[test]
fn test_build_reports_precondition_errors() {
    let mut buffer = vec![0u8; 1024];
    assert_eq!(
        build_table(&mut buffer, &[0x41, 0x110000]).unwrap_err(),
        TableError::InvalidCodePoint {
            codepoint: 0x110000,
            index: 1
        }
    );
    assert_eq!(
        build_table(&mut buffer, &[0x41, 0x41]).unwrap_err(),
        TableError::UnsortedCodePoints { index: 1 }
    );
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_tables_are_send_and_sync() {
    assert_send_sync::<LookupTable<'static>>();
    assert_send_sync::<OwnedTable>();
}

#[test]
fn test_concurrent_lookups_share_one_table() {
    let mut set: Vec<u32> = "ABbd".chars().map(u32::from).collect();
    set.extend(OCTET_2_SET);
    set.extend(OCTET_3_SET);
    set.extend(OCTET_4_SET);
    let owned = OwnedTable::build(&set).unwrap();
    let text = [b"dbBAq".as_slice(), OCTET_2_TEXT, OCTET_3_TEXT, OCTET_4_TEXT].concat();

    let view = owned.table();
    let mut expected = vec![LookupResult::default(); 32];
    let expected_progress = view.lookup_into(&text, &mut expected);

    let runs: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let mut results = vec![LookupResult::default(); 32];
                    let progress = owned.table().lookup_into(&text, &mut results);
                    (progress, results)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(expected_progress.written, 22);
    for (progress, results) in runs {
        assert_eq!(progress, expected_progress);
        assert_eq!(results, expected);
    }
}
