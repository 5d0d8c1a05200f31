//! レア度抽選
//!
//! S:10% / A:20% / B:30% / C:40%。[0,100) の一様乱数を累積しきい値
//! 10/30/60/100 と比較する。表示側のタイミングとは独立した純粋関数。

use crate::types::Rank;
use rand::Rng;

/// 累積しきい値（この値未満ならそのランク）
const THRESHOLDS: [(u32, Rank); 4] = [(10, Rank::S), (30, Rank::A), (60, Rank::B), (100, Rank::C)];

impl Rank {
    /// [0,100) のロール値をランクに変換
    ///
    /// 範囲外の値はCとして扱う。
    pub fn from_roll(roll: u32) -> Rank {
        THRESHOLDS
            .iter()
            .find(|(limit, _)| roll < *limit)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::C)
    }

    pub fn draw<R: Rng>(rng: &mut R) -> Rank {
        Rank::from_roll(rng.gen_range(0..100))
    }

    /// 抽選確率（%）
    pub fn weight(&self) -> u32 {
        match self {
            Rank::S => 10,
            Rank::A => 20,
            Rank::B => 30,
            Rank::C => 40,
        }
    }
}

/// スレッドローカル乱数でランクを抽選
pub fn generate_rank() -> Rank {
    Rank::draw(&mut rand::thread_rng())
}
