//! Property tests over generated records.

use logstore_core::RecordId;
use logstore_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn written_records_read_back_identically(mut batch in batch_strategy(16)) {
        let test_store = TestStore::new();
        test_store.write_batch(&mut batch).unwrap();

        for written in &batch {
            let id = written.id.expect("written record has an id");
            prop_assert!(id.as_i64() > 0);
            let read = test_store.get_by_id(id).unwrap().expect("record present");
            prop_assert_eq!(&read, written);
        }
    }

    #[test]
    fn ids_strictly_increase(batches in prop::collection::vec(batch_strategy(6), 1..6)) {
        let test_store = TestStore::new();
        let mut last = RecordId::new(0);

        for mut batch in batches {
            test_store.write_batch(&mut batch).unwrap();
            for record in &batch {
                let id = record.id.unwrap();
                prop_assert!(id > last, "{} not after {}", id, last);
                last = id;
            }
        }
    }

    #[test]
    fn channel_counts_partition_total(mut batch in batch_strategy(24)) {
        let test_store = TestStore::new();
        test_store.write_batch(&mut batch).unwrap();

        let mut channels: Vec<i32> = batch.iter().map(|r| r.channel).collect();
        channels.sort_unstable();
        channels.dedup();

        let mut sum = 0;
        for channel in channels {
            sum += test_store.count_where(&format!("where channel = {channel}")).unwrap();
        }
        prop_assert_eq!(sum, batch.len() as u64);
        prop_assert_eq!(test_store.count().unwrap(), batch.len() as u64);
    }

    #[test]
    fn paging_matches_slicing(mut batch in batch_strategy(20), limit in 1u32..6, offset in 0u32..25) {
        let test_store = TestStore::new();
        test_store.write_batch(&mut batch).unwrap();

        let page = test_store.get_range("", limit, offset).unwrap();
        let expected: Vec<_> = batch
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        prop_assert_eq!(page, expected);
    }
}
