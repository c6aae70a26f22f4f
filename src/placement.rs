use crate::geometry::ScreenBox;

/// First candidate clear of `avoid`, else the one overlapping it least.
pub fn place_panel(candidates: &[ScreenBox], fallback: ScreenBox, avoid: &ScreenBox) -> ScreenBox {
    let mut best: Option<(f64, ScreenBox)> = None;
    for candidate in candidates {
        let overlap = candidate.overlap_area(avoid);
        if overlap <= 0.0 {
            return *candidate;
        }
        match best {
            Some((area, _)) if area <= overlap => {}
            _ => best = Some((overlap, *candidate)),
        }
    }
    best.map(|(_, panel)| panel).unwrap_or(fallback)
}
