use rand::Rng;

/// 生成对外展示的支付参考号, 形如 FS-7K2M9QX4AB
pub fn generate_payment_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..10)
        .map(|_| {
            let chars = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("FS-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_payment_reference() {
        let reference = generate_payment_reference();
        assert!(reference.starts_with("FS-"));
        assert_eq!(reference.len(), 13);
        // 易混淆字符不应出现
        assert!(!reference[3..].contains('O'));
        assert!(!reference[3..].contains('0'));
        assert!(!reference[3..].contains('I'));
        assert!(!reference[3..].contains('1'));
    }
}
