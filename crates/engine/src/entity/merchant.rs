use super::item_list::ItemList;

/// Index of a merchant within the session's merchant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MerchantId(pub u32);

/// A trading counterpart. Holds its own stock list plus the percentage pair
/// applied to item base value: the sell percentage marks prices up when the
/// player buys, the buy percentage marks them down when the player sells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub id: MerchantId,
    pub label: String,
    buy_percentage: i32,
    sell_percentage: i32,
    stock: ItemList,
}

impl Merchant {
    pub fn new(
        id: MerchantId,
        label: impl Into<String>,
        buy_percentage: i32,
        sell_percentage: i32,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            buy_percentage,
            sell_percentage,
            stock: ItemList::new(),
        }
    }

    pub fn current_buy_percentage(&self) -> i32 {
        self.buy_percentage
    }

    pub fn current_sell_percentage(&self) -> i32 {
        self.sell_percentage
    }

    pub fn stock(&self) -> &ItemList {
        &self.stock
    }

    pub fn stock_mut(&mut self) -> &mut ItemList {
        &mut self.stock
    }
}

/// What the player pays to buy `quantity` units at the merchant's sell
/// percentage. Integer arithmetic with truncating division, kept exact.
pub fn buy_price(base_value: i32, quantity: u32, sell_percentage: i32) -> i32 {
    scaled_price(base_value, quantity, sell_percentage)
}

/// What the player receives selling `quantity` units at the merchant's buy
/// percentage.
pub fn sell_price(base_value: i32, quantity: u32, buy_percentage: i32) -> i32 {
    scaled_price(base_value, quantity, buy_percentage)
}

fn scaled_price(base_value: i32, quantity: u32, percentage: i32) -> i32 {
    let wide = base_value as i64 * quantity as i64 * percentage as i64 / 100;
    wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_price_uses_truncating_integer_arithmetic() {
        // 10 * 3 * 150 / 100 = 45
        assert_eq!(buy_price(10, 3, 150), 45);
        // 7 * 1 * 50 / 100 = 3.5 -> 3
        assert_eq!(sell_price(7, 1, 50), 3);
    }

    #[test]
    fn percentages_are_asymmetric_per_direction() {
        let merchant = Merchant::new(MerchantId(0), "Trader", 50, 150);
        let base_value = 20;
        let pay = buy_price(base_value, 1, merchant.current_sell_percentage());
        let earn = sell_price(base_value, 1, merchant.current_buy_percentage());
        assert_eq!(pay, 30);
        assert_eq!(earn, 10);
        assert!(pay > earn);
    }

    #[test]
    fn large_quantities_do_not_overflow() {
        let price = buy_price(i32::MAX, 1000, 200);
        assert_eq!(price, i32::MAX);
    }
}
