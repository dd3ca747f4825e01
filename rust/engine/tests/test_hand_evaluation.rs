use felt_engine::cards::{parse_cards, Card, Rank as R, Suit as S};
use felt_engine::hand::{compare_hands, evaluate_hand, evaluate_holding, Category, HandRank};

fn c(s: S, r: R) -> Card {
    Card { suit: s, rank: r }
}

fn eval(s: &str) -> HandRank {
    evaluate_hand(&parse_cards(s).expect("valid cards"))
}

#[test]
fn detects_royal_flush() {
    let cards = [
        c(S::Hearts, R::Ten),
        c(S::Hearts, R::Jack),
        c(S::Hearts, R::Queen),
        c(S::Hearts, R::King),
        c(S::Hearts, R::Ace),
        c(S::Clubs, R::Two),
        c(S::Diamonds, R::Three),
    ];
    let hs = evaluate_hand(&cards);
    assert_eq!(hs.category, Category::StraightFlush);
    assert_eq!(hs.primary(), 14);
}

#[test]
fn board_royal_flush_plays_regardless_of_hole_cards() {
    let board = parse_cards("As Ks Qs Js Ts").unwrap();
    let hole = parse_cards("2c 2d").unwrap();
    let hs = evaluate_holding(&hole, &board);
    assert_eq!(hs.category, Category::StraightFlush);
    assert_eq!(hs.category.value(), 8);
    assert_eq!(hs.describe(), "Royal Flush");
}

#[test]
fn quads_from_board_beat_pair_of_kings() {
    let board = parse_cards("7s 7c 2d 9h Ks").unwrap();
    let sevens = evaluate_holding(&parse_cards("7h 7d").unwrap(), &board);
    let big_slick = evaluate_holding(&parse_cards("Ac Kc").unwrap(), &board);
    assert_eq!(sevens.category, Category::FourOfAKind);
    // AK makes two pair (kings and sevens) with the board pair
    assert!(big_slick.category < Category::FourOfAKind);
    assert!(compare_hands(&sevens, &big_slick).is_gt());
}

#[test]
fn category_ordering_is_correct() {
    let quads = eval("Ac Ad Ah As Kc Qd 2h");
    let full_house = eval("Kc Kd Kh Qc Qd 2h 3s");
    assert_eq!(quads.category, Category::FourOfAKind);
    assert_eq!(full_house.category, Category::FullHouse);
    assert!(compare_hands(&quads, &full_house).is_gt());
}

#[test]
fn straight_beats_three_of_a_kind() {
    let straight = eval("5c 6h 7c 8h 9d 2s 3c");
    let trips = eval("Qc Qh Qd 2s 3c 4h 5d");
    assert_eq!(straight.category, Category::Straight);
    assert_eq!(trips.category, Category::ThreeOfAKind);
    assert!(compare_hands(&straight, &trips).is_gt());
}

#[test]
fn flush_beats_straight_and_keeps_top_five_of_suit() {
    let flush = eval("2h 7h Jh Qh 9h 3h Ac");
    assert_eq!(flush.category, Category::Flush);
    assert_eq!(flush.kickers, [12, 11, 9, 7, 3]);
    let straight = eval("5c 6h 7c 8h 9d 2s 3c");
    assert!(compare_hands(&flush, &straight).is_gt());
}

#[test]
fn wheel_is_the_lowest_straight() {
    let wheel = eval("Ah 2c 3d 4s 5h");
    let six_high = eval("2c 3d 4s 5h 6c");
    let trips = eval("Ac Ad Ah Ks Qh");
    assert_eq!(wheel.category, Category::Straight);
    assert_eq!(wheel.primary(), 5);
    assert!(compare_hands(&wheel, &trips).is_gt());
    assert!(compare_hands(&six_high, &wheel).is_gt());
}

#[test]
fn straight_ignores_duplicate_ranks() {
    let hs = eval("9c 9d Th Js Qc Kd 2h");
    assert_eq!(hs.category, Category::Straight);
    assert_eq!(hs.primary(), 13);
}

#[test]
fn two_sets_of_trips_make_full_house_with_higher_trips() {
    let hs = eval("8c 8d 8h 4s 4c 4d Ah");
    assert_eq!(hs.category, Category::FullHouse);
    assert_eq!(&hs.kickers[..2], &[8, 4]);
}

#[test]
fn full_house_prefers_best_pair() {
    let hs = eval("5c 5d 5h Ks Kc 2d 2h");
    assert_eq!(&hs.kickers[..2], &[5, 13]);
    assert_eq!(hs.describe(), "Full House (Fives over Kings)");
}

#[test]
fn two_pair_kicker_can_come_from_a_third_pair() {
    let hs = eval("Ac Ad Kh Ks Qc Qd 2h");
    assert_eq!(hs.category, Category::TwoPair);
    assert_eq!(hs.kickers, [14, 13, 12, 0, 0]);
}

#[test]
fn pair_vs_high_card() {
    let pair = eval("Ac Ah 2s 3d 4c 6d 7h");
    let high = eval("Ac Kh 9s 8d 7c 3d 2h");
    assert_eq!(pair.category, Category::OnePair);
    assert_eq!(high.category, Category::HighCard);
    assert_eq!(high.kickers, [14, 13, 9, 8, 7]);
    assert!(compare_hands(&pair, &high).is_gt());
}

#[test]
fn kickers_break_ties_within_category() {
    let a = eval("Kc Kd Ah 9s 4c 3d 2h");
    let b = eval("Kh Ks Qh 9d 4h 3s 2c");
    assert!(compare_hands(&a, &b).is_gt());
}

#[test]
fn identical_strength_is_a_tie() {
    let board = parse_cards("As Kd Qh Jc 9s").unwrap();
    let a = evaluate_holding(&parse_cards("2c 3d").unwrap(), &board);
    let b = evaluate_holding(&parse_cards("2h 3s").unwrap(), &board);
    assert!(compare_hands(&a, &b).is_eq());
    assert_eq!(a, b);
}

#[test]
fn two_card_queries_degrade_gracefully() {
    let pocket = eval("9c 9d");
    assert_eq!(pocket.category, Category::OnePair);
    assert_eq!(pocket.primary(), 9);

    let unpaired = eval("4h Qs");
    assert_eq!(unpaired.category, Category::HighCard);
    assert_eq!(&unpaired.kickers[..2], &[12, 4]);
}

#[test]
fn four_suited_cards_are_not_a_flush() {
    let hs = eval("2h 7h Jh Qh 9c");
    assert_eq!(hs.category, Category::HighCard);
}

#[test]
fn straight_flush_beats_higher_quads() {
    let sf = eval("5d 6d 7d 8d 9d Ac As");
    let quads = eval("Ac Ad Ah As Kc Qd 2h");
    assert!(compare_hands(&sf, &quads).is_gt());
}
