fn main() {
    jigsaw_playground::run();
}
