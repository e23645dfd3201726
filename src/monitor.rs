// Monitor selection - picks the working area a layout is planned on

use crate::layout::Rect;
use crate::window::WindowApi;
use log::warn;

/// Working area at `index`, falling back to the primary (first) area.
///
/// Returns `None` only when no area is known at all.
pub fn select_working_area(areas: &[Rect], index: usize) -> Option<Rect> {
    match areas.get(index) {
        Some(area) => Some(*area),
        None => {
            if !areas.is_empty() {
                warn!(
                    "Monitor {} not found ({} available); using primary",
                    index,
                    areas.len()
                );
            }
            areas.first().copied()
        }
    }
}

/// Working area of monitor `index` as reported by the OS
pub fn working_area_for(api: &dyn WindowApi, index: usize) -> Option<Rect> {
    select_working_area(&api.working_areas(), index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_in_range() {
        let areas = [Rect::new(0, 0, 1920, 1040), Rect::new(1920, 0, 1280, 984)];
        assert_eq!(select_working_area(&areas, 1), Some(areas[1]));
    }

    #[test]
    fn test_out_of_range_falls_back_to_primary() {
        let areas = [Rect::new(0, 0, 1920, 1040)];
        assert_eq!(select_working_area(&areas, 3), Some(areas[0]));
        assert_eq!(select_working_area(&[], 0), None);
    }
}
