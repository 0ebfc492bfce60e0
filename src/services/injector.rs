use crate::error::Result;
use crate::mappings::KeyIndex;
use parking_lot::Mutex;
use std::sync::Arc;

/// Синтетические нажатия (экранные кнопки, скрипты, другие потоки).
///
/// Клон дешёвый: все клоны разделяют один набор ожидающих инъекций.
/// Инъекция активна ровно в один кадр - в следующий, который снимет диспетчер.
#[derive(Debug, Clone)]
pub struct InputInjector {
    keys: Arc<KeyIndex>,
    pending: Arc<Mutex<Vec<bool>>>,
}

impl InputInjector {
    pub fn new(keys: Arc<KeyIndex>) -> Self {
        let len = keys.len();
        Self {
            keys,
            pending: Arc::new(Mutex::new(vec![false; len])),
        }
    }

    /// Отметить клавишу активной на следующий кадр
    pub fn inject(&self, name: &str) -> Result<()> {
        let key = self.keys.resolve(name)?;
        self.pending.lock()[key.slot()] = true;
        crate::trace_if_enabled!("Инъекция нажатия: {}", name);
        Ok(())
    }

    /// Забрать ожидающие инъекции в `out`, очищая их
    pub(crate) fn drain_into(&self, out: &mut [bool]) {
        let mut pending = self.pending.lock();
        for (dst, src) in out.iter_mut().zip(pending.iter_mut()) {
            *dst = std::mem::take(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComboError;

    #[test]
    fn test_inject_is_consumed_once() {
        let keys = Arc::new(KeyIndex::new(["a", "b"]).unwrap());
        let injector = InputInjector::new(keys);
        let remote = injector.clone();

        remote.inject("b").unwrap();

        let mut out = vec![false; 2];
        injector.drain_into(&mut out);
        assert_eq!(out, vec![false, true]);

        injector.drain_into(&mut out);
        assert_eq!(out, vec![false, false]);
    }

    #[test]
    fn test_inject_unknown_key() {
        let injector = InputInjector::new(Arc::new(KeyIndex::new(["a"]).unwrap()));
        assert!(matches!(injector.inject("q"), Err(ComboError::UnknownKey(_))));
    }

    #[test]
    fn test_inject_from_another_thread() {
        let injector = InputInjector::new(Arc::new(KeyIndex::new(["a"]).unwrap()));
        let remote = injector.clone();

        std::thread::spawn(move || remote.inject("a").unwrap())
            .join()
            .unwrap();

        let mut out = vec![false];
        injector.drain_into(&mut out);
        assert!(out[0]);
    }
}
