/// Bids committed by each player in the round being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundBids {
    bids: Vec<u32>,
}

impl RoundBids {
    pub fn new(number_of_players: usize) -> Self {
        Self {
            bids: vec![0; number_of_players],
        }
    }

    pub fn set(&mut self, player: usize, bid: u32) {
        self.bids[player] = bid;
    }

    pub fn get(&self, player: usize) -> u32 {
        self.bids[player]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bids
    }

    pub fn clear(&mut self) {
        self.bids.fill(0);
    }

    pub fn winner(&self) -> Option<usize> {
        resolve_bids(&self.bids)
    }
}

/// Returns the unique highest bidder, or `None` when everyone passed or the
/// highest bid is shared. Ties forfeit the treat; there is no tie-break.
pub fn resolve_bids(bids: &[u32]) -> Option<usize> {
    let mut best = 0u32;
    let mut leader = None;
    let mut shared = false;

    for (player, &bid) in bids.iter().enumerate() {
        if bid > best {
            best = bid;
            leader = Some(player);
            shared = false;
        } else if bid == best && best > 0 {
            shared = true;
        }
    }

    if shared { None } else { leader }
}
