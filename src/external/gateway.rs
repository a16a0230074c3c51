use crate::config::GatewayConfig;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSession {
    pub session_id: Uuid,
    pub checkout_url: String,
}

/// 模拟支付网关。
///
/// 真实系统里这是一个外部 PSP: 创建收银台会话后由对方以 webhook 回调结算。
/// 这里只生成会话与跳转地址, 结算由 /payment/simulate 以同样的回调语义驱动,
/// 回调重放的防护在结算路径上(条件更新), 不在网关里。
#[derive(Clone)]
pub struct PaymentGateway {
    config: GatewayConfig,
}

impl PaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// 为一笔 pending 交易生成收银台会话, 页面以交易 id 为键
    pub fn create_checkout(
        &self,
        transaction_id: i64,
        payment_reference: &str,
        amount_cents: i64,
    ) -> CheckoutSession {
        let session_id = Uuid::new_v4();
        let checkout_url = format!(
            "{}/{}?session={}&ref={}&amount={}",
            self.config.checkout_base_url.trim_end_matches('/'),
            transaction_id,
            session_id,
            payment_reference,
            amount_cents
        );

        CheckoutSession {
            session_id,
            checkout_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaymentGateway {
        PaymentGateway::new(GatewayConfig {
            checkout_base_url: "https://pay.example.com/checkout/".to_string(),
        })
    }

    #[test]
    fn test_checkout_url_keyed_by_transaction_id() {
        let session = gateway().create_checkout(42, "FS-ABCDEFGHJK", 20000);
        assert!(
            session
                .checkout_url
                .starts_with("https://pay.example.com/checkout/42?session=")
        );
        assert!(session.checkout_url.contains("ref=FS-ABCDEFGHJK"));
        assert!(session.checkout_url.ends_with("&amount=20000"));
    }

    #[test]
    fn test_sessions_are_unique() {
        let g = gateway();
        let a = g.create_checkout(1, "FS-AAAAAAAAAA", 500);
        let b = g.create_checkout(1, "FS-AAAAAAAAAA", 500);
        assert_ne!(a.session_id, b.session_id);
    }
}
