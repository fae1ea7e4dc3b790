use kaddon_common::structure::StructHandle;
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct CountingAllocator;

// Per-thread, so that allocations from the test harness are not counted.
thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static DEALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    let _ = counter.try_with(|c| c.set(c.get() + 1));
}

// SAFETY: every call is forwarded to the system allocator
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        bump(&ALLOCATIONS);
        // SAFETY: forwarded as-is
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        bump(&DEALLOCATIONS);
        // SAFETY: forwarded as-is
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[repr(C)]
#[derive(Copy, Clone, Default, Debug, PartialEq)]
struct Record {
    width: u32,
    height: u32,
    ratio: f32,
}

fn counts() -> (usize, usize) {
    (ALLOCATIONS.with(Cell::get), DEALLOCATIONS.with(Cell::get))
}

#[test]
fn owning_handles_release_exactly_their_allocation() {
    let (alloc_before, dealloc_before) = counts();
    let handle = StructHandle::<Record>::new();
    let (alloc_after, _) = counts();
    assert_eq!(alloc_after - alloc_before, 1);

    drop(handle);
    let (alloc_end, dealloc_end) = counts();
    assert_eq!(alloc_end, alloc_after);
    assert_eq!(dealloc_end - dealloc_before, 1);

    let mut record = Record {
        width: 640,
        height: 480,
        ratio: 1.5,
    };

    let (alloc_before, dealloc_before) = counts();
    let borrowed = StructHandle::borrowed(&mut record);
    drop(borrowed);
    assert_eq!(counts(), (alloc_before, dealloc_before));

    assert_eq!(
        record,
        Record {
            width: 640,
            height: 480,
            ratio: 1.5,
        }
    );
}
