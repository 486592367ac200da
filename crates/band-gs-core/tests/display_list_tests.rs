//! Unit tests for the display-list arena: slot alignment, LIFO rollback,
//! sequential reads, and the transfer lifecycle.

use band_gs_core::gpu::display_list::{DisplayList, ListFull, ListState};

type List = DisplayList<64, 4>;

#[test]
fn record_slots_are_bus_aligned() {
    assert_eq!(List::record_size::<u16>(), 4);
    assert_eq!(List::record_size::<u32>(), 4);
    assert_eq!(List::record_size::<[u8; 5]>(), 8);
}

#[test]
fn push_then_read_back_in_order() {
    let mut list = List::new();
    list.push(0x1234u16).unwrap();
    list.push(0xAABBCCDDu32).unwrap();
    list.push(0x5678u16).unwrap();

    assert_eq!(list.get_next::<u16>(), Some(0x1234));
    assert_eq!(list.get_next::<u32>(), Some(0xAABBCCDD));
    assert_eq!(list.get_next::<u16>(), Some(0x5678));
    assert!(list.at_end());
    assert_eq!(list.get_next::<u16>(), None);
}

#[test]
fn push_fails_full_without_side_effects() {
    let mut list = List::new();
    // 64 bytes = 16 aligned u16 slots.
    for i in 0..16u16 {
        list.push(i).unwrap();
    }
    let free_before = list.free_space();
    assert_eq!(free_before, 0);
    assert_eq!(list.push(99u16), Err(ListFull));
    assert_eq!(list.free_space(), free_before);
}

#[test]
fn remove_undoes_last_push() {
    let mut list = List::new();
    list.push(1u16).unwrap();
    let len = list.len();
    list.push(2u16).unwrap();
    list.remove::<u16>();
    assert_eq!(list.len(), len);

    // The next push lands where the removed record was.
    list.push(3u16).unwrap();
    assert_eq!(list.get_next::<u16>(), Some(1));
    assert_eq!(list.get_next::<u16>(), Some(3));
}

#[test]
fn slot_padding_is_zeroed() {
    let mut list = List::new();
    list.push(0xFFFFu16).unwrap();
    let bytes = list.as_bytes();
    assert_eq!(bytes.len(), 4);
    assert_eq!(&bytes[2..4], &[0, 0]);
}

#[test]
fn reset_get_rewinds_read_cursor() {
    let mut list = List::new();
    list.push(7u16).unwrap();
    assert_eq!(list.get_next::<u16>(), Some(7));
    assert!(list.at_end());
    list.reset_get();
    assert!(!list.at_end());
    assert_eq!(list.get_next::<u16>(), Some(7));
}

#[test]
fn lifecycle_free_queued_transferring_free() {
    let mut list = List::new();
    assert_eq!(list.state(), ListState::Free);
    list.push(1u16).unwrap();
    list.enqueue();
    assert_eq!(list.state(), ListState::Queued);
    list.transfer();
    assert_eq!(list.state(), ListState::Transferring);
    list.clear();
    assert_eq!(list.state(), ListState::Free);
    assert!(list.is_empty());
    assert_eq!(list.free_space(), 64);
}

#[test]
fn get_next_refuses_partial_record() {
    let mut list = List::new();
    list.push(1u16).unwrap();
    // A u64 record (8-byte slot) does not fit in the 4 filled bytes.
    assert_eq!(list.get_next::<u64>(), None);
}
