// Shared fixtures for the summarizer and checkpoint tests.

use burn::backend::{Autodiff, NdArray};

use crate::data::{preprocessor::Preprocessor, vectorizer::Vectorizer};
use crate::infra::tokenizer_store::fit_word_level;
use crate::ml::model::SummarizerConfig;
use crate::ml::summarizer::Summarizer;

pub type TestBackend = Autodiff<NdArray>;

/// Hidden size 10, embedding size 10, at most 10 decoded tokens.
///
/// Both sides share the vocabulary `a b c <start> <end>`:
///   0 <pad>, 1 <unk>, 2 a, 3 b, 4 c, 5 <start>, 6 <end>
pub fn tiny_summarizer(encoder_trainable: bool, decoder_trainable: bool) -> Summarizer<TestBackend> {
    let config = SummarizerConfig::new()
        .with_lstm_size(10)
        .with_embedding_size(10)
        .with_max_prediction_len(10)
        .with_learning_rate(1e-2)
        .with_embedding_encoder_trainable(encoder_trainable)
        .with_embedding_decoder_trainable(decoder_trainable);

    let words = vec!["a b c <start> <end>".to_string()];
    let tokenizer = fit_word_level(&words, None).expect("fit tokenizer");

    let mut summarizer = Summarizer::new(config, Default::default());
    summarizer.init_model(Preprocessor::new(), Vectorizer::new(tokenizer.clone(), tokenizer));
    summarizer
}
