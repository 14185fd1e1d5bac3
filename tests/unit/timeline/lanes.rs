use super::*;

#[test]
fn touching_spans_do_not_overlap() {
    let a = Span::new(0.0, 1.0);
    assert!(!a.overlaps(&Span::new(1.0, 2.0)));
    assert!(!Span::new(1.0, 2.0).overlaps(&a));
    assert!(a.overlaps(&Span::new(0.5, 1.5)));
    assert!(a.overlaps(&Span::new(0.2, 0.3)));
}

#[test]
fn identical_spans_overlap_even_when_empty() {
    assert!(Span::new(1.0, 2.0).overlaps(&Span::new(1.0, 2.0)));
    assert!(Span::new(1.0, 1.0).overlaps(&Span::new(1.0, 1.0)));
    assert!(!Span::new(1.0, 1.0).overlaps(&Span::new(2.0, 2.0)));
}

#[test]
fn disjoint_spans_share_lane_zero() {
    let mut packer = LanePacker::new();
    assert_eq!(packer.place(Span::new(0.0, 1.0)), 0);
    assert_eq!(packer.place(Span::new(1.0, 2.0)), 0);
    assert_eq!(packer.place(Span::new(3.0, 4.0)), 0);
    assert_eq!(packer.lane_count(), 1);
    assert_eq!(packer.spans(0).len(), 3);
}

#[test]
fn identical_spans_go_to_different_lanes() {
    let mut packer = LanePacker::new();
    let span = Span::new(0.5, 0.5);
    assert_eq!(packer.place(span), 0);
    assert_eq!(packer.place(span), 1);
    assert_eq!(packer.place(span), 2);
}

#[test]
fn first_free_lane_is_reused() {
    let mut packer = LanePacker::new();
    assert_eq!(packer.place(Span::new(0.0, 10.0)), 0);
    assert_eq!(packer.place(Span::new(1.0, 2.0)), 1);
    assert_eq!(packer.place(Span::new(1.5, 3.0)), 2);
    assert_eq!(packer.place(Span::new(2.0, 4.0)), 1);
    assert_eq!(packer.place(Span::new(11.0, 12.0)), 0);
    assert!(packer.spans(7).is_empty());
}

#[test]
fn no_lane_ever_holds_overlapping_spans() {
    let mut packer = LanePacker::new();
    let spans: Vec<Span> = (0..40_u32)
        .map(|i| {
            let from = f64::from((i * 7) % 13);
            Span::new(from, from + f64::from(i % 5))
        })
        .collect();
    for span in &spans {
        packer.place(*span);
    }
    for lane in 0..packer.lane_count() {
        let placed = packer.spans(lane);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b), "lane {lane}: {a:?} overlaps {b:?}");
            }
        }
    }
}
