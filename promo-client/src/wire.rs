//! JSON shapes of the promotion service.
//!
//! 64-bit integers arrive either as JSON numbers or as decimal strings, so
//! every integer field goes through [`de_i64`] or one of its siblings.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use promo_core::{
    auction::{AuctionSlot, FixedPriceSlot, SlotStatus},
    moderation::{Application, ApplicationId, ApplicationStatus},
    AuctionSettings, PollQuestion, PromotionId, SegmentId, SlotId,
};
use promo_sync::remote::{RemoteError, RemotePromotion, RemoteSegment};

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

fn parse_int<E: de::Error>(raw: IntOrString) -> Result<i64, E> {
    match raw {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Float(v) if v.fract() == 0.0 => Ok(v as i64),
        IntOrString::Float(v) => Err(E::custom(format!("expected an integer, got {v}"))),
        IntOrString::Str(s) if s.trim().is_empty() => Ok(0),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("expected an integer, got '{s}'"))),
    }
}

pub(crate) fn de_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    parse_int(IntOrString::deserialize(d)?)
}

pub(crate) fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<IntOrString>::deserialize(d)? {
        Some(raw) => parse_int(raw).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn de_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = de_i64(d)?;
    u32::try_from(v).map_err(|_| de::Error::custom(format!("expected a non-negative count, got {v}")))
}

fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    match de_opt_i64(d)? {
        Some(v) => u32::try_from(v)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a non-negative count, got {v}"))),
        None => Ok(None),
    }
}

fn de_price_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<u32, i64>, D::Error> {
    let raw = Option::<BTreeMap<String, IntOrString>>::deserialize(d)?.unwrap_or_default();
    let mut out = BTreeMap::new();
    for (position, price) in raw {
        let position: u32 = position
            .trim()
            .parse()
            .map_err(|_| <D::Error as de::Error>::custom(format!("bad slot position '{position}'")))?;
        out.insert(position, parse_int::<D::Error>(price)?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// `{ id }` reply of the create endpoints.
#[derive(Debug, Deserialize)]
pub struct Created {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireSegment {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    pub name: String,
    pub category_name: String,
    #[serde(deserialize_with = "de_u32")]
    pub order_index: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePollOption {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePollQuestion {
    pub text: String,
    pub options: Vec<WirePollOption>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePoll {
    pub questions: Vec<WirePollQuestion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePromotion {
    #[serde(deserialize_with = "de_opt_i64")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub theme: String,
    pub status: String,
    pub date_from: String,
    pub date_to: String,
    pub identification_mode: String,
    pub pricing_model: String,
    #[serde(deserialize_with = "de_u32")]
    pub slot_count: u32,
    #[serde(deserialize_with = "de_opt_u32")]
    pub discount: Option<u32>,
    #[serde(deserialize_with = "de_opt_u32")]
    pub min_discount: Option<u32>,
    pub stop_factors: Vec<String>,
    pub segments: Vec<WireSegment>,
    #[serde(deserialize_with = "de_price_map")]
    pub fixed_prices: BTreeMap<u32, i64>,
    pub poll: WirePoll,
}

impl From<WirePromotion> for RemotePromotion {
    fn from(w: WirePromotion) -> Self {
        RemotePromotion {
            id: w.id.filter(|id| *id > 0).map(PromotionId),
            name: w.name,
            description: w.description,
            theme: w.theme,
            status: w.status,
            date_from: w.date_from,
            date_to: w.date_to,
            identification_mode: w.identification_mode,
            pricing_model: w.pricing_model,
            slot_count: w.slot_count,
            discount: w.discount.or(w.min_discount).unwrap_or_default(),
            stop_factors: w.stop_factors,
            segments: w
                .segments
                .into_iter()
                .map(|s| RemoteSegment {
                    id: SegmentId(s.id),
                    name: s.name,
                    category: s.category_name,
                    order_index: s.order_index,
                })
                .collect(),
            fixed_prices: w.fixed_prices,
            poll_questions: w
                .poll
                .questions
                .into_iter()
                .map(|q| PollQuestion {
                    question: q.text,
                    options: q.options.into_iter().map(|o| o.text).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAuctionParams {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub min_price: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub bid_step: Option<i64>,
}

impl WireAuctionParams {
    /// Missing parameters fall back to the defaults a new promotion gets.
    pub fn into_settings(self) -> AuctionSettings {
        let defaults = AuctionSettings::default();
        AuctionSettings {
            min_price: self.min_price.unwrap_or(defaults.min_price),
            bid_step: self.bid_step.unwrap_or(defaults.bid_step),
        }
    }
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireApplication {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    #[serde(deserialize_with = "de_i64")]
    pub seller_id: i64,
    #[serde(deserialize_with = "de_i64")]
    pub segment_id: i64,
    #[serde(deserialize_with = "de_i64")]
    pub slot_id: i64,
    pub product_name: String,
    #[serde(deserialize_with = "de_i64")]
    pub price: i64,
    #[serde(deserialize_with = "de_i64")]
    pub discount: i64,
    pub stop_factors: Vec<String>,
    pub status: String,
}

impl WireApplication {
    /// An unknown status is refused rather than guessed: a wrong guess could
    /// let a bulk approval touch it.
    pub fn into_application(self) -> Result<Application, RemoteError> {
        let status = ApplicationStatus::parse(&self.status).ok_or_else(|| {
            RemoteError::MalformedResponse(format!(
                "application {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Application {
            id: ApplicationId(self.id),
            seller_id: self.seller_id,
            segment_id: SegmentId(self.segment_id),
            slot_id: SlotId(self.slot_id),
            product_name: self.product_name,
            price: self.price,
            discount: self.discount,
            stop_factors: self
                .stop_factors
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            status,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireApplications {
    pub applications: Vec<WireApplication>,
}

// ---------------------------------------------------------------------------
// Seller
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireAuctionSlot {
    #[serde(deserialize_with = "de_i64")]
    pub slot_id: i64,
    #[serde(deserialize_with = "de_u32")]
    pub position: u32,
    #[serde(deserialize_with = "de_i64")]
    pub current_bid: i64,
    #[serde(deserialize_with = "de_i64")]
    pub min_bid: i64,
    #[serde(deserialize_with = "de_i64")]
    pub bid_step: i64,
    pub time_left: String,
    pub top_bidder_name: Option<String>,
}

impl From<WireAuctionSlot> for AuctionSlot {
    fn from(w: WireAuctionSlot) -> Self {
        AuctionSlot {
            id: SlotId(w.slot_id),
            position: w.position,
            current_bid: w.current_bid,
            min_bid: w.min_bid,
            bid_step: w.bid_step,
            time_left: w.time_left,
            top_bidder: w.top_bidder_name.filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireFixedSlot {
    #[serde(deserialize_with = "de_i64")]
    pub slot_id: i64,
    #[serde(deserialize_with = "de_u32")]
    pub position: u32,
    #[serde(deserialize_with = "de_i64")]
    pub price: i64,
    pub status: String,
}

impl From<WireFixedSlot> for FixedPriceSlot {
    fn from(w: WireFixedSlot) -> Self {
        // Anything but "available" (pending, moderation, ...) cannot be bought.
        let status = if w.status.eq_ignore_ascii_case("available") {
            SlotStatus::Available
        } else {
            SlotStatus::Occupied
        };
        FixedPriceSlot {
            id: SlotId(w.slot_id),
            position: w.position,
            price: w.price,
            status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireSlotMarket {
    pub auction: Vec<WireAuctionSlot>,
    pub fixed: Vec<WireFixedSlot>,
}

/// Body of `POST /seller/bets/make`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeBet {
    pub seller_id: i64,
    pub slot_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub product_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BetReply {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_status_and_ids_are_parsed() {
        let json = r#"{"applications": [
            {"id": "9", "sellerId": "123", "segmentId": 5, "slotId": "2",
             "productName": "Фитнес-браслет", "price": "3990", "discount": 33,
             "stopFactors": ["  ", "Алкоголь"], "status": "PENDING"}
        ]}"#;
        let wire: WireApplications = serde_json::from_str(json).expect("parse");
        let app = wire
            .applications
            .into_iter()
            .next()
            .expect("one")
            .into_application()
            .expect("known status");
        assert_eq!(app.id, ApplicationId(9));
        assert_eq!(app.segment_id, SegmentId(5));
        assert_eq!(app.price, 3990);
        assert_eq!(app.stop_factors, vec!["Алкоголь"]);
        assert_eq!(app.status, ApplicationStatus::Pending);

        let odd = WireApplication {
            status: "moderation".into(),
            ..WireApplication::default()
        };
        assert!(matches!(
            odd.into_application(),
            Err(RemoteError::MalformedResponse(_))
        ));
    }

    #[test]
    fn promotion_accepts_string_and_number_ids() {
        let json = r#"{
            "id": "12",
            "name": "Spring",
            "slotCount": 10,
            "minDiscount": "15",
            "segments": [
                {"id": "3", "name": "Овен", "categoryName": "Спорт", "orderIndex": 2},
                {"id": 4, "name": "Телец", "categoryName": "Книги", "orderIndex": "1"}
            ],
            "fixedPrices": {"1": "5000", "2": 7000},
            "poll": {"questions": [{"text": "Q?", "options": [{"text": "Да", "value": "да"}]}]}
        }"#;
        let remote: RemotePromotion = serde_json::from_str::<WirePromotion>(json)
            .expect("parse")
            .into();
        assert_eq!(remote.id, Some(PromotionId(12)));
        assert_eq!(remote.discount, 15);
        assert_eq!(remote.segments[0].id, SegmentId(3));
        assert_eq!(remote.segments[1].order_index, 1);
        assert_eq!(remote.fixed_prices.get(&1), Some(&5000));
        assert_eq!(remote.fixed_prices.get(&2), Some(&7000));
        assert_eq!(remote.poll_questions[0].options, vec!["Да"]);
    }

    #[test]
    fn garbage_integer_is_rejected() {
        let err = serde_json::from_str::<WireSegment>(r#"{"id": "abc"}"#).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn created_without_id_is_none() {
        let c: Created = serde_json::from_str(r#"{"status": "NOT_READY"}"#).expect("parse");
        assert_eq!(c.id, None);
        let c: Created = serde_json::from_str(r#"{"id": null}"#).expect("parse");
        assert_eq!(c.id, None);
    }

    #[test]
    fn auction_params_default_when_missing() {
        let p: WireAuctionParams = serde_json::from_str(r#"{"minPrice": "3000"}"#).expect("parse");
        assert_eq!(
            p.into_settings(),
            AuctionSettings {
                min_price: 3000,
                bid_step: 500
            }
        );
    }

    #[test]
    fn non_available_fixed_slot_is_occupied() {
        let w: WireFixedSlot =
            serde_json::from_str(r#"{"slotId": "9", "position": 1, "price": "100", "status": "moderation"}"#)
                .expect("parse");
        let slot: FixedPriceSlot = w.into();
        assert_eq!(slot.status, SlotStatus::Occupied);
    }
}
