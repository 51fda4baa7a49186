/// Feed-forward classifier over bag-of-n-gram vectors
pub mod bag_of_ngrams;
