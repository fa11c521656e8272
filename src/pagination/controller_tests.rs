//! Tests for the pagination controller.

use super::*;
use crate::responsive::{DESKTOP_PROFILE, MOBILE_PROFILE, TABLET_PROFILE};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn config(items_per_page: usize, max_visible_pages: usize) -> PaginationConfig {
    PaginationConfig::new(items_per_page, max_visible_pages).expect("valid config")
}

fn controller_with(total: i64) -> PaginationController {
    let mut controller = PaginationController::new(config(20, 5)).unwrap();
    controller.set_total_items(total).unwrap();
    controller
}

// ===== calculate_pagination =====

#[test]
fn first_page_of_95_items() {
    let state = calculate_pagination(&config(20, 5), 95, 1).unwrap();
    assert_eq!(state.total_pages, 5);
    assert_eq!(state.start_index, 0);
    assert_eq!(state.end_index, 20);
    assert_eq!(state.visible_pages, vec![1, 2, 3, 4, 5]);
    assert!(!state.has_previous);
    assert!(state.has_next);
    assert!(!state.has_ellipsis);
}

#[test]
fn page_beyond_range_clamps_to_last() {
    let state = calculate_pagination(&config(20, 5), 95, 10).unwrap();
    assert_eq!(state.current_page, 5);
    assert_eq!(state.start_index, 80);
    assert_eq!(state.end_index, 95);
    assert!(!state.has_next);
}

#[test]
fn page_below_one_clamps_to_first() {
    let state = calculate_pagination(&config(20, 5), 95, -4).unwrap();
    assert_eq!(state.current_page, 1);
}

#[test]
fn zero_items_yield_single_empty_page() {
    let state = calculate_pagination(&config(20, 5), 0, 3).unwrap();
    assert_eq!(state.current_page, 1);
    assert_eq!(state.total_pages, 0);
    assert_eq!(state.range(), 0..0);
    assert!(state.visible_pages.is_empty());
    assert!(!state.has_previous && !state.has_next);
}

#[test]
fn negative_total_is_rejected() {
    assert_eq!(
        calculate_pagination(&config(20, 5), -1, 1),
        Err(ValidationError::NegativeTotal(-1))
    );
}

#[test]
fn zero_sizes_are_rejected() {
    assert_eq!(PaginationConfig::new(0, 5), Err(ValidationError::ZeroPageSize));
    assert_eq!(PaginationConfig::new(10, 0), Err(ValidationError::ZeroVisiblePages));
}

#[test]
fn window_shifts_back_near_the_end() {
    assert_eq!(visible_window(9, 10, 5), vec![6, 7, 8, 9, 10]);
    assert_eq!(visible_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
    assert_eq!(visible_window(5, 10, 5), vec![3, 4, 5, 6, 7]);
    assert_eq!(visible_window(1, 10, 4), vec![1, 2, 3, 4]);
}

// ===== Navigation =====

#[test]
fn handle_page_change_invokes_callback_synchronously() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut controller = controller_with(95);
    let sink = Rc::clone(&seen);
    controller.set_on_page_change(move |page| sink.borrow_mut().push(page));

    assert!(controller.handle_page_change(3));
    assert_eq!(*seen.borrow(), vec![3]);
    assert_eq!(controller.state().current_page, 3);
    assert_eq!(controller.state().range(), 40..60);
}

#[test]
fn handle_page_change_rejects_out_of_range_and_current() {
    let seen = Rc::new(RefCell::new(0));
    let mut controller = controller_with(95);
    let sink = Rc::clone(&seen);
    controller.set_on_page_change(move |_| *sink.borrow_mut() += 1);

    assert!(!controller.handle_page_change(0));
    assert!(!controller.handle_page_change(6));
    assert!(!controller.handle_page_change(1), "already on page 1");
    assert_eq!(*seen.borrow(), 0);
    assert_eq!(controller.state().current_page, 1);
}

#[test]
fn go_to_helpers_move_between_bounds() {
    let mut controller = controller_with(95);

    assert!(!controller.go_to_previous_page());
    assert!(controller.go_to_next_page());
    assert_eq!(controller.state().current_page, 2);
    assert!(controller.go_to_last_page());
    assert_eq!(controller.state().current_page, 5);
    assert!(!controller.go_to_next_page());
    assert!(controller.go_to_first_page());
    assert_eq!(controller.state().current_page, 1);
}

#[test]
fn shrinking_item_count_clamps_current_page() {
    let mut controller = controller_with(95);
    controller.go_to_last_page();
    let state = controller.set_total_items(30).unwrap();
    assert_eq!(state.current_page, 2);
    assert_eq!(state.range(), 20..30);
}

#[test]
fn failed_item_count_update_keeps_previous_state() {
    let mut controller = controller_with(95);
    controller.go_to_next_page();
    let before = controller.state().clone();
    assert!(controller.set_total_items(-5).is_err());
    assert_eq!(controller.state(), &before);
}

#[test]
fn reset_returns_to_first_page() {
    let mut controller = controller_with(95);
    controller.go_to_last_page();
    assert_eq!(controller.reset(40).unwrap().current_page, 1);
}

// ===== Responsive coupling =====

#[test]
fn apply_profile_rewrites_sizes_and_fires_config_callback() {
    let configs = Rc::new(RefCell::new(Vec::new()));
    let pages = Rc::new(RefCell::new(0));
    let mut controller = controller_with(95);
    let config_sink = Rc::clone(&configs);
    let page_sink = Rc::clone(&pages);
    controller.set_on_config_change(move |c| config_sink.borrow_mut().push(c.items_per_page));
    controller.set_on_page_change(move |_| *page_sink.borrow_mut() += 1);

    assert!(controller.apply_profile(&MOBILE_PROFILE));
    assert_eq!(controller.config().items_per_page, 10);
    assert_eq!(controller.config().max_visible_pages, 3);
    assert_eq!(controller.state().total_pages, 10);
    assert_eq!(*configs.borrow(), vec![10]);
    assert_eq!(*pages.borrow(), 0, "config changes do not fire page callbacks");
}

#[test]
fn apply_profile_keeps_first_visible_item_on_screen() {
    let mut controller = controller_with(95);
    controller.handle_page_change(3); // items 40..60
    controller.apply_profile(&MOBILE_PROFILE);
    assert_eq!(controller.state().current_page, 5);
    assert_eq!(controller.state().range(), 40..50);
}

#[test]
fn apply_profile_is_ignored_when_not_responsive() {
    let mut controller = PaginationController::new(PaginationConfig {
        responsive: false,
        ..config(20, 5)
    })
    .unwrap();
    assert!(!controller.apply_profile(&TABLET_PROFILE));
    assert_eq!(controller.config().items_per_page, 20);
}

#[test]
fn apply_same_profile_twice_is_a_no_op() {
    let mut controller = controller_with(95);
    assert!(controller.apply_profile(&DESKTOP_PROFILE));
    assert!(!controller.apply_profile(&DESKTOP_PROFILE));
}

// ===== Properties =====

proptest! {
    #[test]
    fn total_pages_is_ceiling_and_page_is_clamped(
        total in 0i64..5_000,
        per_page in 1usize..100,
        visible in 1usize..12,
        page in -50i64..500,
    ) {
        let state = calculate_pagination(&config(per_page, visible), total, page).unwrap();
        let total_u = total as usize;
        prop_assert_eq!(state.total_pages, total_u.div_ceil(per_page));
        prop_assert!(state.current_page >= 1);
        prop_assert!(state.current_page <= state.total_pages.max(1));
        prop_assert!(state.start_index <= state.end_index);
        prop_assert!(state.end_index <= total_u);
    }

    #[test]
    fn window_is_contiguous_and_holds_current_page(
        total in 0i64..5_000,
        per_page in 1usize..100,
        visible in 1usize..12,
        page in 1i64..500,
    ) {
        let state = calculate_pagination(&config(per_page, visible), total, page).unwrap();
        let pages = &state.visible_pages;
        prop_assert_eq!(pages.len(), visible.min(state.total_pages));
        prop_assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
        if state.total_pages > 0 {
            prop_assert!(pages.contains(&state.current_page));
        }
    }
}
